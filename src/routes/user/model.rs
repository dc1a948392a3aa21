use serde::Serialize;

use crate::database::Subscription;

/// 用户最多能看到的搜索记录条数
pub const SEARCH_HISTORY_LIMIT: i64 = 50;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    pub plan: String,
    pub searches_used: i32,
    pub searches_limit: i32,
    pub searches_remaining: i32,
    pub is_active: bool,
}

impl From<Subscription> for SubscriptionResponse {
    fn from(subscription: Subscription) -> Self {
        Self {
            searches_remaining: subscription.remaining(),
            plan: subscription.plan,
            searches_used: subscription.searches_used,
            searches_limit: subscription.searches_limit,
            is_active: subscription.is_active,
        }
    }
}
