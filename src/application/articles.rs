//! Article reconciliation: orchestrates reads and writes across the
//! relational store and the record cache.
//!
//! Reads prefer the cache and fall back to the store; writes go to the
//! store first and adjust the cache afterwards from a detached task, so
//! cache trouble can delay freshness but never a response.

use std::collections::HashMap;
use std::sync::Arc;

use metrics::counter;
use thiserror::Error;
use tracing::{debug, warn};

use crate::application::cache::ArticleCache;
use crate::application::pagination::{Page, PageRequest, PaginationError};
use crate::application::repos::{
    ArticleFilter, ArticlesRepo, ArticlesWriteRepo, CreateArticleParams, RepoError,
    UpdateArticleParams,
};
use crate::domain::entities::ArticleRecord;

#[derive(Debug, Error)]
pub enum ArticleError {
    #[error("article not found")]
    NotFound,
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    #[error(transparent)]
    Pagination(#[from] PaginationError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

fn ensure_non_empty(value: &str, field: &'static str) -> Result<(), ArticleError> {
    if value.trim().is_empty() {
        return Err(ArticleError::EmptyField { field });
    }
    Ok(())
}

#[derive(Clone)]
pub struct ArticleService {
    store: Arc<dyn ArticlesRepo>,
    writer: Arc<dyn ArticlesWriteRepo>,
    cache: Arc<dyn ArticleCache>,
}

impl ArticleService {
    pub fn new(
        store: Arc<dyn ArticlesRepo>,
        writer: Arc<dyn ArticlesWriteRepo>,
        cache: Arc<dyn ArticleCache>,
    ) -> Self {
        Self {
            store,
            writer,
            cache,
        }
    }

    /// Fetch one article, cache first. A store hit after a miss
    /// repopulates the cache from a detached task.
    pub async fn view(&self, id: i64) -> Result<ArticleRecord, ArticleError> {
        match self.cache.get(id).await {
            Ok(Some(article)) => {
                counter!("gazette_cache_hit_total").increment(1);
                return Ok(article);
            }
            Ok(None) => {
                counter!("gazette_cache_miss_total").increment(1);
            }
            Err(error) => {
                counter!("gazette_cache_error_total").increment(1);
                warn!(
                    target = "gazette::articles",
                    article = id,
                    error = %error,
                    "cache read failed, falling back to store"
                );
            }
        }

        let article = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(ArticleError::NotFound)?;

        self.spawn_refresh(article.clone());
        Ok(article)
    }

    /// List one page of articles ordered by `created_at` descending.
    ///
    /// The store ranks the page's ids; record bodies are then assembled
    /// cache-first, with every id the cache cannot serve fetched from
    /// the store in a single batch and written back. The first cache
    /// backend failure disables the cache for the rest of this call.
    /// Results always come back in the store's rank order.
    pub async fn list(
        &self,
        filter: &ArticleFilter,
        page: PageRequest,
    ) -> Result<Page<ArticleRecord>, ArticleError> {
        let (ids, total_items) = self.store.list_ids(filter, page).await?;
        let total_pages = page.total_pages(total_items);

        if total_items == 0 {
            return Ok(Page::empty(total_items, total_pages));
        }

        let rank: HashMap<i64, usize> = ids
            .iter()
            .copied()
            .enumerate()
            .map(|(seq, id)| (id, seq))
            .collect();
        let mut slots: Vec<Option<ArticleRecord>> = Vec::with_capacity(ids.len());
        slots.resize_with(ids.len(), || None);

        let mut cache_enabled = true;
        let mut pending = Vec::new();

        for &id in &ids {
            if !cache_enabled {
                pending.push(id);
                continue;
            }
            match self.cache.get(id).await {
                Ok(Some(article)) => {
                    counter!("gazette_cache_hit_total").increment(1);
                    slots[rank[&id]] = Some(article);
                }
                Ok(None) => {
                    counter!("gazette_cache_miss_total").increment(1);
                    pending.push(id);
                }
                Err(error) => {
                    counter!("gazette_cache_error_total").increment(1);
                    warn!(
                        target = "gazette::articles",
                        article = id,
                        error = %error,
                        "cache read failed, disabling cache for this listing"
                    );
                    cache_enabled = false;
                    pending.push(id);
                }
            }
        }

        if !pending.is_empty() {
            for article in self.store.list_by_ids(&pending).await? {
                // A row deleted between the id scan and this fetch no
                // longer ranks; skip it rather than resurface it.
                let Some(&seq) = rank.get(&article.id) else {
                    continue;
                };
                if cache_enabled {
                    if let Err(error) = self.cache.set(&article).await {
                        counter!("gazette_cache_error_total").increment(1);
                        debug!(
                            target = "gazette::articles",
                            article = article.id,
                            error = %error,
                            "cache write-back failed, disabling cache for this listing"
                        );
                        cache_enabled = false;
                    }
                }
                slots[seq] = Some(article);
            }
        }

        let items: Vec<ArticleRecord> = slots.into_iter().flatten().collect();
        Ok(Page {
            items,
            total_items,
            total_pages,
        })
    }

    /// Store a new article. The cache is populated lazily on first read.
    pub async fn create(&self, params: CreateArticleParams) -> Result<ArticleRecord, ArticleError> {
        ensure_non_empty(&params.author, "author")?;
        ensure_non_empty(&params.title, "title")?;
        ensure_non_empty(&params.body, "body")?;

        let article = self.writer.create_article(params).await?;
        Ok(article)
    }

    /// Rewrite an existing article's fields. The store receives the
    /// old-vs-new difference; the cache entry is overwritten (kept
    /// warm, not invalidated) from a detached task.
    pub async fn update(
        &self,
        id: i64,
        params: UpdateArticleParams,
    ) -> Result<ArticleRecord, ArticleError> {
        ensure_non_empty(&params.author, "author")?;
        ensure_non_empty(&params.title, "title")?;
        ensure_non_empty(&params.body, "body")?;

        let old = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(ArticleError::NotFound)?;

        let article = self.writer.update_article(&old, params).await?;

        self.spawn_refresh(article.clone());
        Ok(article)
    }

    /// Soft-delete an article and drop its cache entry from a detached
    /// task.
    pub async fn delete(&self, id: i64) -> Result<(), ArticleError> {
        let article = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(ArticleError::NotFound)?;

        self.writer.delete_article(article.id).await?;

        self.spawn_invalidate(article.id);
        Ok(())
    }

    /// Overwrite the cache entry for `article`. Runs inside the
    /// detached refresh task; callers that need the write to settle
    /// (tests, warmers) can await it directly.
    pub async fn refresh_cache(&self, article: &ArticleRecord) {
        counter!("gazette_cache_refresh_total").increment(1);
        if let Err(error) = self.cache.set(article).await {
            debug!(
                target = "gazette::articles",
                article = article.id,
                error = %error,
                "background cache refresh failed"
            );
        }
    }

    /// Drop the cache entry for `id`. Companion to [`Self::refresh_cache`].
    pub async fn invalidate_cache(&self, id: i64) {
        if let Err(error) = self.cache.delete(id).await {
            debug!(
                target = "gazette::articles",
                article = id,
                error = %error,
                "background cache invalidation failed"
            );
        }
    }

    fn spawn_refresh(&self, article: ArticleRecord) {
        let service = self.clone();
        tokio::spawn(async move { service.refresh_cache(&article).await });
    }

    fn spawn_invalidate(&self, id: i64) {
        let service = self.clone();
        tokio::spawn(async move { service.invalidate_cache(id).await });
    }
}
