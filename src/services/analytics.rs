use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::database::AnalyticsSnapshot;

/// 统计时间范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    Week,
    Month,
    Quarter,
}

impl TimeRange {
    /// 缺省为 7 天, 无法识别的值按 90 天处理
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None | Some("7d") => TimeRange::Week,
            Some("30d") => TimeRange::Month,
            Some(_) => TimeRange::Quarter,
        }
    }

    pub fn days(&self) -> u64 {
        match self {
            TimeRange::Week => 7,
            TimeRange::Month => 30,
            TimeRange::Quarter => 90,
        }
    }

    /// 范围内第一天的零点, 范围包含今天
    pub fn since(&self, today: NaiveDate) -> NaiveDateTime {
        today
            .checked_sub_days(Days::new(self.days() - 1))
            .unwrap_or(NaiveDate::MIN)
            .and_time(NaiveTime::MIN)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyStat {
    pub date: String,
    pub analyses: i64,
    pub users: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRange {
    pub range: &'static str,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopDomain {
    pub domain: String,
    pub analyses: i64,
    pub avg_trust_score: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlagCategory {
    pub category: &'static str,
    pub count: i64,
}

/// 管理后台统计报表
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub total_analyses: i64,
    pub total_users: i64,
    pub average_trust_score: i64,
    pub flagged_websites: i64,
    pub free_users: i64,
    pub pro_users: i64,
    pub elite_users: i64,
    pub free_to_pro_conversion: f64,
    pub pro_to_elite_conversion: f64,
    pub free_to_elite_conversion: f64,
    pub daily_stats: Vec<DailyStat>,
    pub trust_score_distribution: Vec<ScoreRange>,
    pub top_domains: Vec<TopDomain>,
    pub flags_by_category: Vec<FlagCategory>,
}

/// `upper / (base + upper)` 的百分比, 保留两位小数; `base` 为 0 时为 0
fn conversion(base: i64, upper: i64) -> f64 {
    if base <= 0 {
        return 0.0;
    }
    let rate = upper as f64 / (base + upper) as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}

impl AnalyticsReport {
    pub fn build(snapshot: AnalyticsSnapshot, range: TimeRange, today: NaiveDate) -> Self {
        let plans = snapshot.plan_counts;

        // 没有记录的日期补 0
        let daily_stats = (0..range.days())
            .rev()
            .filter_map(|offset| today.checked_sub_days(Days::new(offset)))
            .map(|day| {
                let activity = snapshot.daily_activity.iter().find(|a| a.day == day);
                DailyStat {
                    date: day.format("%Y-%m-%d").to_string(),
                    analyses: activity.map_or(0, |a| a.analyses),
                    users: activity.map_or(0, |a| a.users),
                }
            })
            .collect();

        let buckets = snapshot.score_buckets;
        let trust_score_distribution = vec![
            ScoreRange { range: "90-100", count: buckets.from_90 },
            ScoreRange { range: "80-89", count: buckets.from_80 },
            ScoreRange { range: "70-79", count: buckets.from_70 },
            ScoreRange { range: "60-69", count: buckets.from_60 },
            ScoreRange { range: "50-59", count: buckets.from_50 },
            ScoreRange { range: "0-49", count: buckets.below_50 },
        ];

        let flags = snapshot.flag_counts;
        let flags_by_category = vec![
            FlagCategory { category: "Privacy Concerns", count: flags.privacy },
            FlagCategory { category: "Political Donations", count: flags.political },
            FlagCategory { category: "Legal Issues", count: flags.legal },
            FlagCategory { category: "Environmental Issues", count: flags.environmental },
            FlagCategory { category: "Labor Practices", count: flags.labor },
        ];

        let top_domains = snapshot
            .top_domains
            .into_iter()
            .map(|d| TopDomain {
                domain: d.domain,
                analyses: d.analyses,
                avg_trust_score: d.avg_trust_score.unwrap_or(0.0).round() as i64,
            })
            .collect();

        Self {
            total_analyses: snapshot.total_analyses,
            total_users: plans.total(),
            average_trust_score: snapshot.average_trust_score.unwrap_or(0.0).round() as i64,
            flagged_websites: snapshot.flagged_websites,
            free_users: plans.free,
            pro_users: plans.pro,
            elite_users: plans.enterprise,
            free_to_pro_conversion: conversion(plans.free, plans.pro),
            pro_to_elite_conversion: conversion(plans.pro, plans.enterprise),
            free_to_elite_conversion: conversion(plans.free, plans.enterprise),
            daily_stats,
            trust_score_distribution,
            top_domains,
            flags_by_category,
        }
    }
}
