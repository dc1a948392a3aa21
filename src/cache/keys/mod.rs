/// 缓存键模块
pub mod analysis_keys;
pub mod rate_limit_keys;

pub use analysis_keys::{
    analysis_payload_key, analysis_timestamp_key, analysis_timestamp_pattern,
    family_from_timestamp_key,
};
pub use rate_limit_keys::{rate_limit_key, redis_rate_limit_key};
