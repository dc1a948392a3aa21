use std::sync::Arc;
use std::time::Duration;

use crate::cache::clock::Clock;
use crate::cache::keys::rate_limit_key;
use crate::cache::models::RateLimitDecision;
use crate::cache::store::RateLimitStore;

/// 单个接口的限流规则
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitRule {
    pub namespace: String,
    pub limit: u32,
    pub window: Duration,
}

impl RateLimitRule {
    pub fn new(namespace: impl Into<String>, limit: u32, window: Duration) -> Self {
        Self {
            namespace: namespace.into(),
            limit,
            window,
        }
    }
}

/// 准入控制器: 固定窗口计数
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// 检查并计入一次请求
    ///
    /// 存储不可用时放行。
    pub async fn check_and_consume(
        &self,
        identifier: &str,
        limit: u32,
        window: Duration,
    ) -> RateLimitDecision {
        let now = self.clock.now_ms();
        let window_ms = window.as_millis() as i64;

        match self.store.consume(identifier, limit, window_ms, now).await {
            Ok(decision) => {
                if !decision.allowed {
                    tracing::info!("Rate limit exceeded for {}", identifier);
                }
                decision
            }
            Err(e) => {
                tracing::warn!("Rate limit store unavailable, allowing {}: {}", identifier, e);
                RateLimitDecision::first(limit, now + window_ms)
            }
        }
    }

    /// 按规则检查, 调用方标识加上接口命名空间
    pub async fn check(&self, rule: &RateLimitRule, identifier: &str) -> RateLimitDecision {
        let key = rate_limit_key(&rule.namespace, identifier);
        self.check_and_consume(&key, rule.limit, rule.window).await
    }

    /// 清理过期窗口
    pub async fn sweep(&self) -> usize {
        match self.store.sweep(self.clock.now_ms()).await {
            Ok(removed) => removed,
            Err(e) => {
                tracing::warn!("Rate limit sweep failed: {}", e);
                0
            }
        }
    }
}
