use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;
use sqlx::types::Json;

use super::models::{
    AnalyticsSnapshot, DailyActivity, DomainActivity, FlagCounts, PlanCounts, ScoreBuckets,
    SearchHistoryItem, Subscription, WebsiteRecord,
};
use super::repository::{RepoResult, Repository};

/// Postgres 仓储, 表结构由网站前端的迁移脚本维护
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// `analysis_data` 中某个数组字段非空
fn non_empty(field: &str) -> String {
    format!(
        "(CASE WHEN jsonb_typeof(analysis_data->'{field}') = 'array' \
         THEN jsonb_array_length(analysis_data->'{field}') ELSE 0 END) > 0"
    )
}

#[async_trait]
impl Repository for PgRepository {
    async fn find_subscription(&self, user_id: &str) -> RepoResult<Option<Subscription>> {
        sqlx::query_as::<_, Subscription>(
            r#"
            SELECT
                "userId" AS user_id,
                plan,
                COALESCE("searchesUsed", 0) AS searches_used,
                COALESCE("searchesLimit", 5) AS searches_limit,
                COALESCE("isActive", true) AS is_active
            FROM "userSubscriptions"
            WHERE "userId" = $1
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn increment_usage(&self, user_id: &str) -> RepoResult<i32> {
        let (used,): (i32,) = sqlx::query_as(
            r#"
            UPDATE "userSubscriptions"
            SET "searchesUsed" = COALESCE("searchesUsed", 0) + 1, "updatedAt" = NOW()
            WHERE "userId" = $1
            RETURNING "searchesUsed"
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(used)
    }

    async fn upsert_website(&self, record: &WebsiteRecord) -> RepoResult<i32> {
        let analysis = &record.analysis;

        let (id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO websites (
                domain, analysis_data, company_name, trust_score,
                name, owner, ultimate_control, bias, stakeholders, revenue, flags
            )
            VALUES ($1, $2, $3, $4, $3, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (domain) DO UPDATE SET
                analysis_data = EXCLUDED.analysis_data,
                company_name = EXCLUDED.company_name,
                trust_score = EXCLUDED.trust_score,
                name = EXCLUDED.name,
                owner = EXCLUDED.owner,
                ultimate_control = EXCLUDED.ultimate_control,
                bias = EXCLUDED.bias,
                stakeholders = EXCLUDED.stakeholders,
                revenue = EXCLUDED.revenue,
                flags = EXCLUDED.flags,
                last_updated = NOW()
            RETURNING id
            "#,
        )
        .bind(&record.domain)
        .bind(Json(analysis))
        .bind(&analysis.company_name)
        .bind(analysis.trust_score)
        .bind(&record.owner)
        .bind(&record.ultimate_control)
        .bind(&record.bias)
        .bind(Json(&analysis.political_donations))
        .bind(Json(&analysis.secure_payment_methods))
        .bind(Json(&record.flags))
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn record_search(&self, user_id: &str, website_id: i32, url: &str) -> RepoResult<()> {
        sqlx::query(r#"INSERT INTO searches ("userId", "websiteId", url) VALUES ($1, $2, $3)"#)
            .bind(user_id)
            .bind(website_id)
            .bind(url)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn recent_searches(&self, user_id: &str, limit: i64) -> RepoResult<Vec<SearchHistoryItem>> {
        sqlx::query_as::<_, SearchHistoryItem>(
            r#"
            SELECT
                s.id,
                s.url,
                s."createdAt" AS created_at,
                w.name AS website_name,
                w.domain AS website_domain,
                w.trust_score
            FROM searches s
            LEFT JOIN websites w ON s."websiteId" = w.id
            WHERE s."userId" = $1
            ORDER BY s."createdAt"
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn analytics_snapshot(&self, since: NaiveDateTime) -> RepoResult<AnalyticsSnapshot> {
        let (total_analyses, average_trust_score, flagged_websites): (i64, Option<f64>, i64) =
            sqlx::query_as(
                r#"
                SELECT
                    COUNT(*),
                    AVG(trust_score)::float8,
                    COUNT(*) FILTER (WHERE trust_score < 70)
                FROM websites
                "#,
            )
            .fetch_one(&self.pool)
            .await?;

        let plan_rows: Vec<(String, i64)> =
            sqlx::query_as(r#"SELECT plan, COUNT(*) FROM "userSubscriptions" GROUP BY plan"#)
                .fetch_all(&self.pool)
                .await?;
        let mut plan_counts = PlanCounts::default();
        for (plan, count) in &plan_rows {
            plan_counts.add(plan, *count);
        }

        let daily_activity = sqlx::query_as::<_, DailyActivity>(
            r#"
            SELECT
                DATE("createdAt") AS day,
                COUNT(*) AS analyses,
                COUNT(DISTINCT "userId") AS users
            FROM searches
            WHERE "createdAt" >= $1
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        let score_buckets = sqlx::query_as::<_, ScoreBuckets>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE trust_score >= 90) AS from_90,
                COUNT(*) FILTER (WHERE trust_score BETWEEN 80 AND 89) AS from_80,
                COUNT(*) FILTER (WHERE trust_score BETWEEN 70 AND 79) AS from_70,
                COUNT(*) FILTER (WHERE trust_score BETWEEN 60 AND 69) AS from_60,
                COUNT(*) FILTER (WHERE trust_score BETWEEN 50 AND 59) AS from_50,
                COUNT(*) FILTER (WHERE trust_score < 50) AS below_50
            FROM websites
            WHERE trust_score IS NOT NULL
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let top_domains = sqlx::query_as::<_, DomainActivity>(
            r#"
            SELECT
                w.domain,
                COUNT(*) AS analyses,
                AVG(w.trust_score)::float8 AS avg_trust_score
            FROM searches s
            JOIN websites w ON s."websiteId" = w.id
            WHERE s."createdAt" >= $1
            GROUP BY w.domain
            ORDER BY analyses DESC
            LIMIT 5
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        let flag_sql = format!(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE (analysis_data->>'privacy_policy_present') = 'false' OR {breaches}) AS privacy,
                COUNT(*) FILTER (WHERE {donations} OR {pacs}) AS political,
                COUNT(*) FILTER (WHERE {lawsuits} OR {violations}) AS legal,
                COUNT(*) FILTER (WHERE {environment}) AS environmental,
                COUNT(*) FILTER (WHERE {labor}) AS labor
            FROM websites
            WHERE trust_score < 70
            "#,
            breaches = non_empty("data_breach_history"),
            donations = non_empty("political_donations"),
            pacs = non_empty("pac_contributions"),
            lawsuits = non_empty("lawsuits"),
            violations = non_empty("regulatory_violations"),
            environment = non_empty("environmental_record"),
            labor = non_empty("labor_practices_news"),
        );
        let flag_counts = sqlx::query_as::<_, FlagCounts>(&flag_sql)
            .fetch_one(&self.pool)
            .await?;

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
