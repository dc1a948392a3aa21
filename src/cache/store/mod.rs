//! 限流表与分析缓存的存储后端
//!
//! 内存后端只在单个进程内生效; 多实例部署时改用 Redis 后端共享计数和缓存。

mod memory;
mod redis_store;

use async_trait::async_trait;

use crate::cache::models::{CachedAnalysis, RateLimitDecision};

pub use memory::{MemoryAnalysisStore, MemoryRateLimitStore};
pub use redis_store::{RedisAnalysisStore, RedisRateLimitStore};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// 原子地执行一次固定窗口检查并计数
    async fn consume(
        &self,
        key: &str,
        limit: u32,
        window_ms: i64,
        now_ms: i64,
    ) -> StoreResult<RateLimitDecision>;

    /// 删除已过期的窗口, 返回删除数量
    async fn sweep(&self, now_ms: i64) -> StoreResult<usize>;
}

#[async_trait]
pub trait AnalysisStore: Send + Sync {
    async fn load(&self, family: &str) -> StoreResult<Option<CachedAnalysis>>;

    async fn save(&self, family: &str, entry: &CachedAnalysis) -> StoreResult<()>;

    /// 仅当条目的写入时间仍为 `stored_at` 时删除, 返回是否删除
    async fn remove_if_stale(&self, family: &str, stored_at: i64) -> StoreResult<bool>;

    /// 删除 `now - stored_at >= ttl` 的条目, 返回删除数量
    async fn sweep(&self, now_ms: i64, ttl_ms: i64) -> StoreResult<usize>;
}
