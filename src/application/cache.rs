//! Cache port for per-record article entries.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::ArticleRecord;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),
    #[error("cache payload error: {0}")]
    Payload(String),
}

impl CacheError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }

    pub fn payload(err: impl std::fmt::Display) -> Self {
        Self::Payload(err.to_string())
    }
}

/// Key/value access to individual article entries.
///
/// `get` distinguishes a clean miss (`Ok(None)`) from a backend failure
/// (`Err`); callers fall back to the store on either, but only the
/// latter disables further cache use within the operation. Writes are
/// best-effort and must never abort the calling operation.
#[async_trait]
pub trait ArticleCache: Send + Sync {
    async fn get(&self, id: i64) -> Result<Option<ArticleRecord>, CacheError>;

    async fn set(&self, article: &ArticleRecord) -> Result<(), CacheError>;

    async fn delete(&self, id: i64) -> Result<(), CacheError>;
}
