use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

use super::{AnalysisCache, RateLimiter};

/// 后台定时清理过期的缓存条目和限流窗口
pub fn spawn_sweeper(cache: AnalysisCache, limiter: RateLimiter, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // 第一次 tick 立即返回, 跳过
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let analyses = cache.sweep().await;
            let windows = limiter.sweep().await;
            if analyses > 0 || windows > 0 {
                tracing::info!(
                    "Swept {} expired cache entries and {} rate limit windows",
                    analyses,
                    windows
                );
            }
        }
    })
}
