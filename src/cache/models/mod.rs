/// 缓存数据模型
pub mod analysis;
pub mod rate_limit;

pub use analysis::CachedAnalysis;
pub use rate_limit::{CachedRateLimit, RateLimitDecision};
