use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 分析结果缓存条目, 按公司键存储
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CachedAnalysis {
    pub payload: Value,
    pub stored_at: i64, // 毫秒时间戳
}

impl CachedAnalysis {
    pub fn new(payload: Value, stored_at: i64) -> Self {
        Self { payload, stored_at }
    }

    pub fn is_fresh(&self, now_ms: i64, ttl_ms: i64) -> bool {
        now_ms - self.stored_at < ttl_ms
    }
}
