use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::FromRow;

use crate::analysis::WebsiteAnalysis;

/// 订阅计划
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Pro,
    Enterprise,
}

impl Plan {
    pub fn parse(plan: &str) -> Option<Self> {
        match plan {
            "free" => Some(Plan::Free),
            "pro" => Some(Plan::Pro),
            "enterprise" => Some(Plan::Enterprise),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Pro => "pro",
            Plan::Enterprise => "enterprise",
        }
    }

    /// 每个计费周期可用的分析次数
    pub fn search_limit(&self) -> i32 {
        match self {
            Plan::Free => 5,
            Plan::Pro => 100,
            Plan::Enterprise => 500,
        }
    }
}

/// 用户订阅与用量
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Subscription {
    pub user_id: String,
    pub plan: String,
    pub searches_used: i32,
    pub searches_limit: i32,
    pub is_active: bool,
}

impl Subscription {
    pub fn new(user_id: &str, plan: Plan) -> Self {
        Self {
            user_id: user_id.to_string(),
            plan: plan.as_str().to_string(),
            searches_used: 0,
            searches_limit: plan.search_limit(),
            is_active: true,
        }
    }

    pub fn remaining(&self) -> i32 {
        self.searches_limit - self.searches_used
    }

    pub fn is_exhausted(&self) -> bool {
        self.searches_used >= self.searches_limit
    }
}

/// websites 表的一行, 旧字段从分析结果派生
#[derive(Debug, Clone, PartialEq)]
pub struct WebsiteRecord {
    pub domain: String,
    pub analysis: WebsiteAnalysis,
    pub owner: String,
    pub ultimate_control: String,
    pub bias: String,
    pub flags: Vec<String>,
}

impl WebsiteRecord {
    pub fn from_analysis(domain: &str, analysis: &WebsiteAnalysis) -> Self {
        let bias = analysis.industry_lobbying_positions.join(", ");

        Self {
            domain: domain.to_string(),
            analysis: analysis.clone(),
            owner: or_unknown(analysis.parent_company.as_deref()),
            ultimate_control: or_unknown(analysis.ownership_structure.as_deref()),
            bias: or_unknown(Some(&bias)),
            flags: analysis
                .recent_negative_press
                .iter()
                .filter_map(|item| item.title.clone())
                .collect(),
        }
    }
}

fn or_unknown(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "Unknown".to_string(),
    }
}

/// 用户的搜索记录
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistoryItem {
    pub id: i32,
    pub url: String,
    pub created_at: Option<NaiveDateTime>,
    pub website_name: Option<String>,
    pub website_domain: Option<String>,
    pub trust_score: Option<i32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanCounts {
    pub free: i64,
    pub pro: i64,
    pub enterprise: i64,
}

impl PlanCounts {
    pub fn add(&mut self, plan: &str, count: i64) {
        match Plan::parse(plan) {
            Some(Plan::Free) => self.free += count,
            Some(Plan::Pro) => self.pro += count,
            Some(Plan::Enterprise) => self.enterprise += count,
            None => tracing::debug!("Ignoring unknown plan {}", plan),
        }
    }

    pub fn total(&self) -> i64 {
        self.free + self.pro + self.enterprise
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct DailyActivity {
    pub day: NaiveDate,
    pub analyses: i64,
    pub users: i64,
}

/// 信任分分布
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct ScoreBuckets {
    pub from_90: i64,
    pub from_80: i64,
    pub from_70: i64,
    pub from_60: i64,
    pub from_50: i64,
    pub below_50: i64,
}

impl ScoreBuckets {
    pub fn add(&mut self, score: i32) {
        match score {
            90.. => self.from_90 += 1,
            80..=89 => self.from_80 += 1,
            70..=79 => self.from_70 += 1,
            60..=69 => self.from_60 += 1,
            50..=59 => self.from_50 += 1,
            _ => self.below_50 += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DomainActivity {
    pub domain: String,
    pub analyses: i64,
    pub avg_trust_score: Option<f64>,
}

/// 被标记网站按问题类别计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct FlagCounts {
    pub privacy: i64,
    pub political: i64,
    pub legal: i64,
    pub environmental: i64,
    pub labor: i64,
}

impl FlagCounts {
    pub fn add(&mut self, analysis: &WebsiteAnalysis) {
        self.privacy += analysis.has_privacy_concerns() as i64;
        self.political += analysis.has_political_activity() as i64;
        self.legal += analysis.has_legal_issues() as i64;
        self.environmental += analysis.has_environmental_issues() as i64;
        self.labor += analysis.has_labor_issues() as i64;
    }
}

/// 管理后台统计所需的原始聚合数据
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyticsSnapshot {
    pub total_analyses: i64,
    pub average_trust_score: Option<f64>,
    pub flagged_websites: i64,
    pub plan_counts: PlanCounts,
    pub daily_activity: Vec<DailyActivity>,
    pub score_buckets: ScoreBuckets,
    pub top_domains: Vec<DomainActivity>,
    pub flag_counts: FlagCounts,
}
