//! Shared in-memory doubles for the store and cache ports.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};

use async_trait::async_trait;
use time::macros::datetime;
use time::{Duration, OffsetDateTime};
use tokio::sync::RwLock;

use gazette::application::articles::ArticleService;
use gazette::application::cache::{ArticleCache, CacheError};
use gazette::application::pagination::PageRequest;
use gazette::application::repos::{
    ArticleFilter, ArticlesRepo, ArticlesWriteRepo, CreateArticleParams, RepoError,
    UpdateArticleParams,
};
use gazette::domain::entities::ArticleRecord;

const CLOCK_BASE: OffsetDateTime = datetime!(2026-01-01 00:00 UTC);

struct StoredArticle {
    record: ArticleRecord,
    deleted_at: Option<OffsetDateTime>,
}

/// Store double with a deterministic clock: every insert lands one
/// second after the previous one, so listing order is predictable.
#[derive(Default)]
pub struct InMemoryStore {
    rows: RwLock<Vec<StoredArticle>>,
    next_id: AtomicI64,
    pub find_calls: AtomicU64,
    pub list_ids_calls: AtomicU64,
    pub list_by_ids_calls: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn find_call_count(&self) -> u64 {
        self.find_calls.load(Ordering::SeqCst)
    }

    pub fn list_by_ids_call_count(&self) -> u64 {
        self.list_by_ids_calls.load(Ordering::SeqCst)
    }

    fn matches(&self, filter: &ArticleFilter, record: &ArticleRecord) -> bool {
        if let Some(author) = filter.author.as_ref() {
            if !record
                .author
                .to_lowercase()
                .contains(&author.to_lowercase())
            {
                return false;
            }
        }

        if let Some(terms) = filter.search_terms() {
            if terms.is_empty() {
                return false;
            }
            // Mirror the engine: compare significant characters only,
            // and match when any one term is present.
            let haystack = format!("{} {}", record.title, record.body).to_lowercase();
            let words: Vec<String> = haystack
                .split_whitespace()
                .map(|word| word.chars().filter(|c| c.is_alphanumeric()).collect())
                .collect();
            if !terms
                .iter()
                .any(|term| words.contains(&term.to_lowercase()))
            {
                return false;
            }
        }

        true
    }
}

#[async_trait]
impl ArticlesRepo for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<ArticleRecord>, RepoError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .find(|row| row.record.id == id && row.deleted_at.is_none())
            .map(|row| row.record.clone()))
    }

    async fn list_ids(
        &self,
        filter: &ArticleFilter,
        page: PageRequest,
    ) -> Result<(Vec<i64>, u64), RepoError> {
        self.list_ids_calls.fetch_add(1, Ordering::SeqCst);
        let rows = self.rows.read().await;

        let mut matched: Vec<&ArticleRecord> = rows
            .iter()
            .filter(|row| row.deleted_at.is_none())
            .map(|row| &row.record)
            .filter(|record| self.matches(filter, record))
            .collect();
        matched.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = matched.len() as u64;
        let offset = page.offset() as usize;
        let limit = page.limit() as usize;
        let ids = matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|record| record.id)
            .collect();

        Ok((ids, total))
    }

    async fn list_by_ids(&self, ids: &[i64]) -> Result<Vec<ArticleRecord>, RepoError> {
        self.list_by_ids_calls.fetch_add(1, Ordering::SeqCst);
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .filter(|row| row.deleted_at.is_none() && ids.contains(&row.record.id))
            .map(|row| row.record.clone())
            .collect())
    }
}

#[async_trait]
impl ArticlesWriteRepo for InMemoryStore {
    async fn create_article(
        &self,
        params: CreateArticleParams,
    ) -> Result<ArticleRecord, RepoError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let stamp = CLOCK_BASE + Duration::seconds(id);
        let record = ArticleRecord {
            id,
            author: params.author,
            title: params.title,
            body: params.body,
            created_at: stamp,
            updated_at: stamp,
        };

        let mut rows = self.rows.write().await;
        rows.push(StoredArticle {
            record: record.clone(),
            deleted_at: None,
        });
        Ok(record)
    }

    async fn update_article(
        &self,
        old: &ArticleRecord,
        params: UpdateArticleParams,
    ) -> Result<ArticleRecord, RepoError> {
        let mut rows = self.rows.write().await;
        let row = rows
            .iter_mut()
            .find(|row| row.record.id == old.id && row.deleted_at.is_none())
            .ok_or(RepoError::NotFound)?;

        row.record.author = params.author;
        row.record.title = params.title;
        row.record.body = params.body;
        row.record.updated_at = row.record.updated_at + Duration::seconds(1);
        Ok(row.record.clone())
    }

    async fn delete_article(&self, id: i64) -> Result<(), RepoError> {
        let mut rows = self.rows.write().await;
        let row = rows
            .iter_mut()
            .find(|row| row.record.id == id && row.deleted_at.is_none())
            .ok_or(RepoError::NotFound)?;
        row.deleted_at = Some(row.record.updated_at + Duration::seconds(1));
        Ok(())
    }
}

/// Cache double whose reads and writes can be switched to fail with a
/// backend error, plus call counters for asserting degradation paths.
#[derive(Default)]
pub struct ScriptedCache {
    entries: RwLock<HashMap<i64, ArticleRecord>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    pub get_calls: AtomicU64,
    pub set_calls: AtomicU64,
    pub delete_calls: AtomicU64,
}

impl ScriptedCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_reads(&self, enabled: bool) {
        self.fail_reads.store(enabled, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, enabled: bool) {
        self.fail_writes.store(enabled, Ordering::SeqCst);
    }

    pub fn get_call_count(&self) -> u64 {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn set_call_count(&self) -> u64 {
        self.set_calls.load(Ordering::SeqCst)
    }

    /// Seed an entry directly, bypassing failure flags and counters.
    pub async fn seed(&self, article: ArticleRecord) {
        let mut entries = self.entries.write().await;
        entries.insert(article.id, article);
    }

    /// Inspect an entry directly, bypassing failure flags and counters.
    pub async fn peek(&self, id: i64) -> Option<ArticleRecord> {
        let entries = self.entries.read().await;
        entries.get(&id).cloned()
    }
}

#[async_trait]
impl ArticleCache for ScriptedCache {
    async fn get(&self, id: i64) -> Result<Option<ArticleRecord>, CacheError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(CacheError::backend("cache backend unreachable"));
        }
        let entries = self.entries.read().await;
        Ok(entries.get(&id).cloned())
    }

    async fn set(&self, article: &ArticleRecord) -> Result<(), CacheError> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CacheError::backend("cache backend unreachable"));
        }
        let mut entries = self.entries.write().await;
        entries.insert(article.id, article.clone());
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), CacheError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CacheError::backend("cache backend unreachable"));
        }
        let mut entries = self.entries.write().await;
        entries.remove(&id);
        Ok(())
    }
}

pub fn service(store: &Arc<InMemoryStore>, cache: &Arc<ScriptedCache>) -> ArticleService {
    let reader: Arc<dyn ArticlesRepo> = store.clone();
    let writer: Arc<dyn ArticlesWriteRepo> = store.clone();
    let article_cache: Arc<dyn ArticleCache> = cache.clone();
    ArticleService::new(reader, writer, article_cache)
}

pub fn create_params(author: &str, title: &str, body: &str) -> CreateArticleParams {
    CreateArticleParams {
        author: author.to_string(),
        title: title.to_string(),
        body: body.to_string(),
    }
}

pub fn update_params(author: &str, title: &str, body: &str) -> UpdateArticleParams {
    UpdateArticleParams {
        author: author.to_string(),
        title: title.to_string(),
        body: body.to_string(),
    }
}
