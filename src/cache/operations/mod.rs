/// 缓存操作
pub mod analysis;
pub mod rate_limit;
pub mod sweeper;

pub use analysis::{AnalysisCache, DEFAULT_CACHE_TTL};
pub use rate_limit::{RateLimitRule, RateLimiter};
pub use sweeper::spawn_sweeper;
