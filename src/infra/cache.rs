//! Article cache backends: process-local memory, Redis, or none.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bb8_redis::{RedisConnectionManager, bb8, redis::AsyncCommands};
use tokio::sync::RwLock;

use crate::application::cache::{ArticleCache, CacheError};
use crate::config::{CacheBackend, CacheSettings};
use crate::domain::entities::ArticleRecord;
use crate::infra::error::InfraError;

fn cache_key(id: i64) -> String {
    format!("article_{id}")
}

/// Build the cache backend selected by configuration.
pub async fn build(settings: &CacheSettings) -> Result<Arc<dyn ArticleCache>, InfraError> {
    match settings.backend {
        CacheBackend::Memory => Ok(Arc::new(MemoryArticleCache::new())),
        CacheBackend::Redis => {
            let url = settings.redis_url.as_deref().ok_or_else(|| {
                InfraError::configuration("cache.redis_url is required for the redis backend")
            })?;
            let cache = RedisArticleCache::connect(url, settings.ttl_seconds)
                .await
                .map_err(|err| InfraError::cache(err.to_string()))?;
            Ok(Arc::new(cache))
        }
        CacheBackend::Disabled => Ok(Arc::new(DisabledArticleCache)),
    }
}

/// Process-local cache. Never fails; entries live until invalidated.
#[derive(Clone, Default)]
pub struct MemoryArticleCache {
    entries: Arc<RwLock<HashMap<i64, ArticleRecord>>>,
}

impl MemoryArticleCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArticleCache for MemoryArticleCache {
    async fn get(&self, id: i64) -> Result<Option<ArticleRecord>, CacheError> {
        let guard = self.entries.read().await;
        Ok(guard.get(&id).cloned())
    }

    async fn set(&self, article: &ArticleRecord) -> Result<(), CacheError> {
        let mut guard = self.entries.write().await;
        guard.insert(article.id, article.clone());
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), CacheError> {
        let mut guard = self.entries.write().await;
        guard.remove(&id);
        Ok(())
    }
}

/// Redis-backed cache. Entries are JSON payloads under `article_{id}`
/// keys with a bounded lifetime.
pub struct RedisArticleCache {
    pool: bb8::Pool<RedisConnectionManager>,
    ttl_seconds: u64,
}

impl RedisArticleCache {
    pub async fn connect(url: &str, ttl_seconds: u64) -> Result<Self, CacheError> {
        let manager = RedisConnectionManager::new(url).map_err(CacheError::backend)?;
        let pool = bb8::Pool::builder()
            .build(manager)
            .await
            .map_err(CacheError::backend)?;
        Ok(Self { pool, ttl_seconds })
    }
}

#[async_trait]
impl ArticleCache for RedisArticleCache {
    async fn get(&self, id: i64) -> Result<Option<ArticleRecord>, CacheError> {
        let mut conn = self.pool.get().await.map_err(CacheError::backend)?;
        let payload: Option<String> = conn
            .get(cache_key(id))
            .await
            .map_err(CacheError::backend)?;
        payload
            .map(|raw| serde_json::from_str(&raw).map_err(CacheError::payload))
            .transpose()
    }

    async fn set(&self, article: &ArticleRecord) -> Result<(), CacheError> {
        let payload = serde_json::to_string(article).map_err(CacheError::payload)?;
        let mut conn = self.pool.get().await.map_err(CacheError::backend)?;
        let _: () = conn
            .set_ex(cache_key(article.id), payload, self.ttl_seconds)
            .await
            .map_err(CacheError::backend)?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await.map_err(CacheError::backend)?;
        let _: () = conn
            .del(cache_key(id))
            .await
            .map_err(CacheError::backend)?;
        Ok(())
    }
}

/// Cache-off backend: every read is a clean miss, writes are discarded.
pub struct DisabledArticleCache;

#[async_trait]
impl ArticleCache for DisabledArticleCache {
    async fn get(&self, _id: i64) -> Result<Option<ArticleRecord>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _article: &ArticleRecord) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete(&self, _id: i64) -> Result<(), CacheError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn article(id: i64) -> ArticleRecord {
        ArticleRecord {
            id,
            author: "ada".to_string(),
            title: "title".to_string(),
            body: "body".to_string(),
            created_at: datetime!(2026-01-01 00:00 UTC),
            updated_at: datetime!(2026-01-01 00:00 UTC),
        }
    }

    #[test]
    fn cache_keys_are_namespaced_by_id() {
        assert_eq!(cache_key(42), "article_42");
    }

    #[tokio::test]
    async fn memory_cache_round_trips_and_invalidates() {
        let cache = MemoryArticleCache::new();

        assert!(cache.get(1).await.unwrap().is_none());

        cache.set(&article(1)).await.unwrap();
        assert_eq!(cache.get(1).await.unwrap(), Some(article(1)));

        cache.delete(1).await.unwrap();
        assert!(cache.get(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn memory_cache_delete_is_idempotent() {
        let cache = MemoryArticleCache::new();
        cache.delete(7).await.unwrap();
        cache.delete(7).await.unwrap();
        assert!(cache.get(7).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn disabled_cache_always_misses() {
        let cache = DisabledArticleCache;
        cache.set(&article(1)).await.unwrap();
        assert!(cache.get(1).await.unwrap().is_none());
    }
}
