use serde::{Deserialize, Serialize};

/// 速率限制计数窗口
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct CachedRateLimit {
    pub count: u32,
    pub reset_at: i64, // 毫秒时间戳
}

/// 一次准入检查的结果
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at: i64,
}

impl CachedRateLimit {
    /// 打开一个新窗口, 计入本次请求
    pub fn open(now_ms: i64, window_ms: i64) -> Self {
        Self {
            count: 1,
            reset_at: now_ms + window_ms,
        }
    }

    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms > self.reset_at
    }

    /// 固定窗口计数: 过期则重开窗口, 未满则计数加一, 已满则拒绝
    ///
    /// 窗口边界两侧可以各放行 `limit` 次请求。
    pub fn admit(&mut self, limit: u32, window_ms: i64, now_ms: i64) -> RateLimitDecision {
        if self.is_expired(now_ms) {
            *self = Self::open(now_ms, window_ms);
            return RateLimitDecision::first(limit, self.reset_at);
        }

        if self.count >= limit {
            return RateLimitDecision {
                allowed: false,
                remaining: 0,
                reset_at: self.reset_at,
            };
        }

        self.count += 1;
        RateLimitDecision {
            allowed: true,
            remaining: limit - self.count,
            reset_at: self.reset_at,
        }
    }
}

impl RateLimitDecision {
    /// 新窗口的第一次请求总是放行
    pub fn first(limit: u32, reset_at: i64) -> Self {
        Self {
            allowed: true,
            remaining: limit.saturating_sub(1),
            reset_at,
        }
    }

    /// `X-RateLimit-Reset` 使用的秒级时间戳, 向上取整
    pub fn reset_at_secs(&self) -> i64 {
        (self.reset_at + 999).div_euclid(1000)
    }
}
