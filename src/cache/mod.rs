// 缓存模块
// 限流表和分析结果缓存, 存储后端可替换

pub mod clock;
pub mod keys;
pub mod models;
pub mod operations;
pub mod store;

// 重新导出常用类型
pub use clock::{Clock, ManualClock, SystemClock};
pub use models::{CachedAnalysis, CachedRateLimit, RateLimitDecision};
pub use operations::{AnalysisCache, DEFAULT_CACHE_TTL, RateLimitRule, RateLimiter, spawn_sweeper};
pub use store::{
    AnalysisStore, MemoryAnalysisStore, MemoryRateLimitStore, RateLimitStore, RedisAnalysisStore,
    RedisRateLimitStore, StoreError,
};
