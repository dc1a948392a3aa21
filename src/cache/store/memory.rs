use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::{AnalysisStore, RateLimitStore, StoreResult};
use crate::cache::models::{CachedAnalysis, CachedRateLimit, RateLimitDecision};

/// 进程内限流表
///
/// 同一个键的读-改-写在 DashMap 的分片锁内完成, 并发请求不会同时越过上限。
#[derive(Debug, Default)]
pub struct MemoryRateLimitStore {
    entries: DashMap<String, CachedRateLimit>,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl RateLimitStore for MemoryRateLimitStore {
    async fn consume(
        &self,
        key: &str,
        limit: u32,
        window_ms: i64,
        now_ms: i64,
    ) -> StoreResult<RateLimitDecision> {
        let decision = match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => occupied.get_mut().admit(limit, window_ms, now_ms),
            Entry::Vacant(vacant) => {
                let entry = CachedRateLimit::open(now_ms, window_ms);
                vacant.insert(entry);
                RateLimitDecision::first(limit, entry.reset_at)
            }
        };
        Ok(decision)
    }

    async fn sweep(&self, now_ms: i64) -> StoreResult<usize> {
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let keep = !entry.is_expired(now_ms);
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }
}

/// 进程内分析结果缓存
#[derive(Debug, Default)]
pub struct MemoryAnalysisStore {
    entries: DashMap<String, CachedAnalysis>,
}

impl MemoryAnalysisStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, family: &str) -> bool {
        self.entries.contains_key(family)
    }
}

#[async_trait]
impl AnalysisStore for MemoryAnalysisStore {
    async fn load(&self, family: &str) -> StoreResult<Option<CachedAnalysis>> {
        Ok(self.entries.get(family).map(|entry| entry.value().clone()))
    }

    async fn save(&self, family: &str, entry: &CachedAnalysis) -> StoreResult<()> {
        self.entries.insert(family.to_string(), entry.clone());
        Ok(())
    }

    async fn remove_if_stale(&self, family: &str, stored_at: i64) -> StoreResult<bool> {
        let removed = self
            .entries
            .remove_if(family, |_, entry| entry.stored_at == stored_at)
            .is_some();
        Ok(removed)
    }

    async fn sweep(&self, now_ms: i64, ttl_ms: i64) -> StoreResult<usize> {
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let keep = entry.is_fresh(now_ms, ttl_ms);
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_consumers_never_exceed_the_limit() {
        let store = Arc::new(MemoryRateLimitStore::new());
        let mut handles = Vec::new();
        for _ in 0..64 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.consume("analyze:a@b.c", 10, 60_000, 1_000).await.unwrap().allowed
            }));
        }

        let mut allowed = 0;
        for handle in handles {
            if handle.await.unwrap() {
                allowed += 1;
            }
        }
        assert_eq!(allowed, 10);
    }

    #[tokio::test]
    async fn sweep_drops_only_expired_windows() {
        let store = MemoryRateLimitStore::new();
        store.consume("old", 5, 1_000, 0).await.unwrap();
        store.consume("new", 5, 1_000, 5_000).await.unwrap();

        assert_eq!(store.sweep(5_500).await.unwrap(), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn analysis_sweep_uses_ttl() {
        let store = MemoryAnalysisStore::new();
        store
            .save("amazon", &CachedAnalysis::new(json!({"trustScore": 70}), 0))
            .await
            .unwrap();
        store
            .save("shopify", &CachedAnalysis::new(json!({"trustScore": 80}), 500))
            .await
            .unwrap();

        assert_eq!(store.sweep(1_000, 1_000).await.unwrap(), 1);
        assert!(!store.contains("amazon"));
        assert!(store.contains("shopify"));
    }

    #[tokio::test]
    async fn conditional_remove_checks_the_timestamp() {
        let store = MemoryAnalysisStore::new();
        store
            .save("target", &CachedAnalysis::new(json!({"trustScore": 77}), 2_000))
            .await
            .unwrap();

        assert!(!store.remove_if_stale("target", 1_000).await.unwrap());
        assert!(store.contains("target"));
        assert!(store.remove_if_stale("target", 2_000).await.unwrap());
        assert!(!store.contains("target"));
        assert!(!store.remove_if_stale("target", 2_000).await.unwrap());
    }
}
