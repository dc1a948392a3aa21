use async_trait::async_trait;
use chrono::NaiveDateTime;

use super::models::{AnalyticsSnapshot, SearchHistoryItem, Subscription, WebsiteRecord};

pub type RepoResult<T> = Result<T, sqlx::Error>;

/// 持久化存储: 订阅用量、网站分析结果、搜索记录
#[async_trait]
pub trait Repository: Send + Sync {
    async fn find_subscription(&self, user_id: &str) -> RepoResult<Option<Subscription>>;

    /// 用量加一, 返回新的已用次数
    async fn increment_usage(&self, user_id: &str) -> RepoResult<i32>;

    /// 按域名插入或更新, 返回网站 id
    async fn upsert_website(&self, record: &WebsiteRecord) -> RepoResult<i32>;

    async fn record_search(&self, user_id: &str, website_id: i32, url: &str) -> RepoResult<()>;

    /// 按时间正序返回最多 `limit` 条
    async fn recent_searches(&self, user_id: &str, limit: i64) -> RepoResult<Vec<SearchHistoryItem>>;

    async fn analytics_snapshot(&self, since: NaiveDateTime) -> RepoResult<AnalyticsSnapshot>;
}
