use std::sync::Arc;
use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::cache::clock::Clock;
use crate::cache::models::CachedAnalysis;
use crate::cache::store::AnalysisStore;
use crate::domain::resolve_family;

/// 默认缓存 24 小时
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// 分析结果缓存
///
/// 按公司键存储, 读取时把结果里的 `domain` 改回调用方请求的域名。
/// 存储出错只记日志, 读按未命中处理, 写直接放弃。
#[derive(Clone)]
pub struct AnalysisCache {
    store: Arc<dyn AnalysisStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl AnalysisCache {
    pub fn new(store: Arc<dyn AnalysisStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self { store, clock, ttl }
    }

    fn ttl_ms(&self) -> i64 {
        self.ttl.as_millis() as i64
    }

    pub async fn get<T: DeserializeOwned>(&self, domain: &str) -> Option<T> {
        let family = resolve_family(domain)?;

        let entry = match self.store.load(&family).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Analysis cache read failed for {}: {}", family, e);
                return None;
            }
        };

        if !entry.is_fresh(self.clock.now_ms(), self.ttl_ms()) {
            tracing::debug!("Analysis cache entry for {} expired", family);
            // 期间被重新写入的条目保留
            match self.store.remove_if_stale(&family, entry.stored_at).await {
                Ok(true) => {}
                Ok(false) => tracing::debug!("Cache entry {} was refreshed concurrently", family),
                Err(e) => tracing::warn!("Failed to purge expired cache entry {}: {}", family, e),
            }
            return None;
        }

        let mut payload = entry.payload;
        if let Some(fields) = payload.as_object_mut() {
            fields.insert("domain".to_string(), Value::String(domain.to_string()));
        }

        match serde_json::from_value(payload) {
            Ok(value) => {
                tracing::debug!("Analysis cache hit for {} (family {})", domain, family);
                Some(value)
            }
            Err(e) => {
                tracing::warn!("Cached analysis for {} has unexpected shape: {}", family, e);
                None
            }
        }
    }

    pub async fn put<T: Serialize>(&self, domain: &str, payload: &T) {
        let Some(family) = resolve_family(domain) else {
            return;
        };

        let payload = match serde_json::to_value(payload) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Failed to serialize analysis for {}: {}", domain, e);
                return;
            }
        };

        let entry = CachedAnalysis::new(payload, self.clock.now_ms());
        if let Err(e) = self.store.save(&family, &entry).await {
            tracing::warn!("Analysis cache write failed for {}: {}", family, e);
        }
    }

    /// 清理过期条目
    pub async fn sweep(&self) -> usize {
        match self.store.sweep(self.clock.now_ms(), self.ttl_ms()).await {
            Ok(removed) => removed,
            Err(e) => {
                tracing::warn!("Analysis cache sweep failed: {}", e);
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::cache::clock::ManualClock;
    use crate::cache::store::{MemoryAnalysisStore, StoreError, StoreResult};

    fn cache() -> (AnalysisCache, Arc<MemoryAnalysisStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryAnalysisStore::new());
        let clock = Arc::new(ManualClock::new(0));
        let cache = AnalysisCache::new(store.clone(), clock.clone(), DEFAULT_CACHE_TTL);
        (cache, store, clock)
    }

    #[tokio::test]
    async fn family_members_share_an_entry() {
        let (cache, _, _) = cache();
        cache
            .put("google.com", &json!({"trustScore": 88, "domain": "google.com"}))
            .await;

        let hit: Value = cache.get("youtube.com").await.unwrap();
        assert_eq!(hit["trustScore"], 88);
        assert_eq!(hit["domain"], "youtube.com");
    }

    #[tokio::test]
    async fn ttl_boundary() {
        let (cache, store, clock) = cache();
        cache
            .put("amazon.de", &json!({"trustScore": 70, "domain": "amazon.de"}))
            .await;

        clock.set(86_400_000 - 1);
        let hit: Value = cache.get("amazon.com").await.unwrap();
        assert_eq!(hit, json!({"trustScore": 70, "domain": "amazon.com"}));

        clock.set(86_400_001);
        assert!(cache.get::<Value>("amazon.com").await.is_none());
        assert!(!store.contains("amazon"));
    }

    #[tokio::test]
    async fn expiry_at_exactly_ttl() {
        let (cache, store, clock) = cache();
        cache.put("shopify.com", &json!({"trustScore": 60})).await;

        clock.advance(DEFAULT_CACHE_TTL);
        assert!(cache.get::<Value>("shopify.com").await.is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn sweep_removes_stale_entries() {
        let (cache, store, clock) = cache();
        cache.put("netflix.com", &json!({"trustScore": 75})).await;
        clock.advance(Duration::from_secs(23 * 60 * 60));
        cache.put("etsy.com", &json!({"trustScore": 81})).await;

        clock.advance(Duration::from_secs(60 * 60));
        assert_eq!(cache.sweep().await, 1);
        assert!(store.contains("etsy"));
        assert!(!store.contains("netflix"));
    }

    #[tokio::test]
    async fn empty_domain_is_never_cached() {
        let (cache, store, _) = cache();
        cache.put("", &json!({"trustScore": 1})).await;
        assert!(store.is_empty());
        assert!(cache.get::<Value>("").await.is_none());
    }

    /// 读到过期条目后, 另一个请求抢先写入新结果
    struct RefreshedDuringLoad {
        inner: Arc<MemoryAnalysisStore>,
        fresh: CachedAnalysis,
    }

    #[async_trait]
    impl AnalysisStore for RefreshedDuringLoad {
        async fn load(&self, family: &str) -> StoreResult<Option<CachedAnalysis>> {
            let stale = self.inner.load(family).await?;
            self.inner.save(family, &self.fresh).await?;
            Ok(stale)
        }

        async fn save(&self, family: &str, entry: &CachedAnalysis) -> StoreResult<()> {
            self.inner.save(family, entry).await
        }

        async fn remove_if_stale(&self, family: &str, stored_at: i64) -> StoreResult<bool> {
            self.inner.remove_if_stale(family, stored_at).await
        }

        async fn sweep(&self, now_ms: i64, ttl_ms: i64) -> StoreResult<usize> {
            self.inner.sweep(now_ms, ttl_ms).await
        }
    }

    #[tokio::test]
    async fn stale_purge_keeps_a_concurrent_refresh() {
        let inner = Arc::new(MemoryAnalysisStore::new());
        let clock = Arc::new(ManualClock::new(0));
        inner
            .save("amazon", &CachedAnalysis::new(json!({"trustScore": 10}), 0))
            .await
            .unwrap();

        let now = DEFAULT_CACHE_TTL.as_millis() as i64 + 5;
        clock.set(now);
        let store = RefreshedDuringLoad {
            inner: inner.clone(),
            fresh: CachedAnalysis::new(json!({"trustScore": 99}), now),
        };
        let cache = AnalysisCache::new(Arc::new(store), clock.clone(), DEFAULT_CACHE_TTL);

        assert!(cache.get::<Value>("amazon.com").await.is_none());

        let survivor = inner.load("amazon").await.unwrap().unwrap();
        assert_eq!(survivor.stored_at, now);
        assert_eq!(survivor.payload["trustScore"], 99);
    }

    struct BrokenStore;

    fn broken() -> StoreError {
        StoreError::Serialization(serde_json::from_str::<u32>("x").unwrap_err())
    }

    #[async_trait]
    impl AnalysisStore for BrokenStore {
        async fn load(&self, _: &str) -> StoreResult<Option<CachedAnalysis>> {
            Err(broken())
        }

        async fn save(&self, _: &str, _: &CachedAnalysis) -> StoreResult<()> {
            Err(broken())
        }

        async fn remove_if_stale(&self, _: &str, _: i64) -> StoreResult<bool> {
            Err(broken())
        }

        async fn sweep(&self, _: i64, _: i64) -> StoreResult<usize> {
            Err(broken())
        }
    }

    #[tokio::test]
    async fn store_failure_degrades_to_a_miss() {
        let cache = AnalysisCache::new(
            Arc::new(BrokenStore),
            Arc::new(ManualClock::new(0)),
            DEFAULT_CACHE_TTL,
        );
        cache.put("amazon.com", &json!({"trustScore": 70})).await;
        assert!(cache.get::<Value>("amazon.com").await.is_none());
        assert_eq!(cache.sweep().await, 0);
    }
}
