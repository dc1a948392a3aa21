use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use tokio::sync::RwLock;

use super::models::{
    AnalyticsSnapshot, DailyActivity, DomainActivity, FlagCounts, PlanCounts, ScoreBuckets,
    SearchHistoryItem, Subscription, WebsiteRecord,
};
use super::repository::{RepoResult, Repository};

#[derive(Debug, Clone)]
struct StoredWebsite {
    id: i32,
    record: WebsiteRecord,
}

#[derive(Debug, Clone)]
struct StoredSearch {
    id: i32,
    user_id: String,
    website_id: i32,
    url: String,
    created_at: NaiveDateTime,
}

#[derive(Debug, Default)]
struct State {
    subscriptions: HashMap<String, Subscription>,
    websites: Vec<StoredWebsite>,
    searches: Vec<StoredSearch>,
}

impl State {
    fn website(&self, id: i32) -> Option<&StoredWebsite> {
        self.websites.iter().find(|w| w.id == id)
    }
}

/// 进程内仓储, 未配置 DATABASE_URL 时使用
#[derive(Debug, Default)]
pub struct MemoryRepository {
    state: RwLock<State>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入或覆盖一条订阅
    pub async fn insert_subscription(&self, subscription: Subscription) {
        let mut state = self.state.write().await;
        state
            .subscriptions
            .insert(subscription.user_id.clone(), subscription);
    }

    pub async fn website_count(&self) -> usize {
        self.state.read().await.websites.len()
    }

    pub async fn search_count(&self) -> usize {
        self.state.read().await.searches.len()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn find_subscription(&self, user_id: &str) -> RepoResult<Option<Subscription>> {
        Ok(self.state.read().await.subscriptions.get(user_id).cloned())
    }

    async fn increment_usage(&self, user_id: &str) -> RepoResult<i32> {
        let mut state = self.state.write().await;
        match state.subscriptions.get_mut(user_id) {
            Some(subscription) => {
                subscription.searches_used += 1;
                Ok(subscription.searches_used)
            }
            None => Err(sqlx::Error::RowNotFound),
        }
    }

    async fn upsert_website(&self, record: &WebsiteRecord) -> RepoResult<i32> {
        let mut state = self.state.write().await;

        if let Some(existing) = state
            .websites
            .iter_mut()
            .find(|w| w.record.domain == record.domain)
        {
            existing.record = record.clone();
            return Ok(existing.id);
        }

        let id = state.websites.len() as i32 + 1;
        state.websites.push(StoredWebsite {
            id,
            record: record.clone(),
        });
        Ok(id)
    }

    async fn record_search(&self, user_id: &str, website_id: i32, url: &str) -> RepoResult<()> {
        let mut state = self.state.write().await;
        let id = state.searches.len() as i32 + 1;
        state.searches.push(StoredSearch {
            id,
            user_id: user_id.to_string(),
            website_id,
            url: url.to_string(),
            created_at: Utc::now().naive_utc(),
        });
        Ok(())
    }

    async fn recent_searches(&self, user_id: &str, limit: i64) -> RepoResult<Vec<SearchHistoryItem>> {
        let state = self.state.read().await;
        let limit = usize::try_from(limit).unwrap_or(0);

        let items = state
            .searches
            .iter()
            .filter(|s| s.user_id == user_id)
            .take(limit)
            .map(|s| {
                let website = state.website(s.website_id);
                SearchHistoryItem {
                    id: s.id,
                    url: s.url.clone(),
                    created_at: Some(s.created_at),
                    website_name: website.map(|w| w.record.analysis.company_name.clone()),
                    website_domain: website.map(|w| w.record.domain.clone()),
                    trust_score: website.map(|w| w.record.analysis.trust_score),
                }
            })
            .collect();

        Ok(items)
    }

    async fn analytics_snapshot(&self, since: NaiveDateTime) -> RepoResult<AnalyticsSnapshot> {
        let state = self.state.read().await;

        let mut score_buckets = ScoreBuckets::default();
        let mut flag_counts = FlagCounts::default();
        let mut score_sum = 0i64;
        let mut flagged_websites = 0i64;
        for website in &state.websites {
            let analysis = &website.record.analysis;
            score_sum += analysis.trust_score as i64;
            score_buckets.add(analysis.trust_score);
            if analysis.is_flagged() {
                flagged_websites += 1;
                flag_counts.add(analysis);
            }
        }

        let total_analyses = state.websites.len() as i64;
        let average_trust_score =
            (total_analyses > 0).then(|| score_sum as f64 / total_analyses as f64);

        let mut plan_counts = PlanCounts::default();
        for subscription in state.subscriptions.values() {
            plan_counts.add(&subscription.plan, 1);
        }

        // 按天聚合
        let mut days: BTreeMap<NaiveDate, (i64, HashSet<&str>)> = BTreeMap::new();
        // 域名 -> (次数, 分数和)
        let mut domains: HashMap<&str, (i64, i64)> = HashMap::new();
        for search in state.searches.iter().filter(|s| s.created_at >= since) {
            let day = days.entry(search.created_at.date()).or_default();
            day.0 += 1;
            day.1.insert(search.user_id.as_str());

            if let Some(website) = state.website(search.website_id) {
                let entry = domains.entry(website.record.domain.as_str()).or_default();
                entry.0 += 1;
                entry.1 += website.record.analysis.trust_score as i64;
            }
        }

        let daily_activity = days
            .into_iter()
            .map(|(day, (analyses, users))| DailyActivity {
                day,
                analyses,
                users: users.len() as i64,
            })
            .collect();

        let mut top_domains: Vec<DomainActivity> = domains
            .into_iter()
            .map(|(domain, (analyses, score_sum))| DomainActivity {
                domain: domain.to_string(),
                analyses,
                avg_trust_score: Some(score_sum as f64 / analyses as f64),
            })
            .collect();
        top_domains.sort_by(|a, b| b.analyses.cmp(&a.analyses).then_with(|| a.domain.cmp(&b.domain)));
        top_domains.truncate(5);

        Ok(AnalyticsSnapshot {
            total_analyses,
            average_trust_score,
            flagged_websites,
            plan_counts,
            daily_activity,
            score_buckets,
            top_domains,
            flag_counts,
        })
    }
}
