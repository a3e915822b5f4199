//! Store ports describing the relational persistence adapter.

use async_trait::async_trait;
use thiserror::Error;

use crate::application::pagination::PageRequest;
use crate::domain::entities::ArticleRecord;

/// Search words shorter than this carry no relevance weight in the
/// full-text engine and are dropped from the query input.
pub const MIN_SEARCH_TERM_CHARS: usize = 3;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Listing filter. Blank inputs mean "no filter", never "match empty".
#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
    pub author: Option<String>,
    pub query: Option<String>,
}

impl ArticleFilter {
    pub fn new(author: Option<String>, query: Option<String>) -> Self {
        let normalize = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        Self {
            author: normalize(author),
            query: normalize(query),
        }
    }

    /// Search words reduced to their significant (alphanumeric)
    /// characters, keeping only those that meet the minimum length. A
    /// row matches when it contains any one of them.
    ///
    /// `None` means no full-text filter was requested; `Some(vec![])`
    /// means a filter was requested but no word is long enough to
    /// match, so the listing cannot return anything.
    pub fn search_terms(&self) -> Option<Vec<String>> {
        self.query.as_deref().map(|query| {
            query
                .split_whitespace()
                .map(|word| {
                    word.chars()
                        .filter(|c| c.is_alphanumeric())
                        .collect::<String>()
                })
                .filter(|word| word.chars().count() >= MIN_SEARCH_TERM_CHARS)
                .collect()
        })
    }
}

#[derive(Debug, Clone)]
pub struct CreateArticleParams {
    pub author: String,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct UpdateArticleParams {
    pub author: String,
    pub title: String,
    pub body: String,
}

#[async_trait]
pub trait ArticlesRepo: Send + Sync {
    /// Fetch one live article. `Ok(None)` covers both unknown and
    /// soft-deleted ids; errors are infrastructure failures only.
    async fn find_by_id(&self, id: i64) -> Result<Option<ArticleRecord>, RepoError>;

    /// Ids for one page of the filtered listing, newest first, plus the
    /// total match count across all pages.
    async fn list_ids(
        &self,
        filter: &ArticleFilter,
        page: PageRequest,
    ) -> Result<(Vec<i64>, u64), RepoError>;

    /// Full records for an explicit id set, unordered, excluding
    /// soft-deleted rows.
    async fn list_by_ids(&self, ids: &[i64]) -> Result<Vec<ArticleRecord>, RepoError>;
}

#[async_trait]
pub trait ArticlesWriteRepo: Send + Sync {
    async fn create_article(&self, params: CreateArticleParams)
    -> Result<ArticleRecord, RepoError>;

    /// Write the difference between the caller's `old` snapshot and the
    /// new field values; `updated_at` is refreshed either way.
    async fn update_article(
        &self,
        old: &ArticleRecord,
        params: UpdateArticleParams,
    ) -> Result<ArticleRecord, RepoError>;

    /// Soft delete: the row is stamped, not removed.
    async fn delete_article(&self, id: i64) -> Result<(), RepoError>;
}
