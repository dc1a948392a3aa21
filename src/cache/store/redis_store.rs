use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient, Script};

use super::{AnalysisStore, RateLimitStore, StoreResult};
use crate::cache::keys::{
    analysis_payload_key, analysis_timestamp_key, analysis_timestamp_pattern,
    family_from_timestamp_key, redis_rate_limit_key,
};
use crate::cache::models::{CachedAnalysis, RateLimitDecision};

/// 固定窗口计数脚本, 返回 {allowed, remaining, reset_at}
///
/// 键在窗口结束后由 Redis 自动过期, 不需要额外清理。
static CONSUME_SCRIPT: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r#"
        local key = KEYS[1]
        local limit = tonumber(ARGV[1])
        local window_ms = tonumber(ARGV[2])
        local now_ms = tonumber(ARGV[3])

        local count = tonumber(redis.call('HGET', key, 'count'))
        local reset_at = tonumber(redis.call('HGET', key, 'reset_at'))

        if count == nil or reset_at == nil or now_ms > reset_at then
            reset_at = now_ms + window_ms
            redis.call('HSET', key, 'count', 1, 'reset_at', reset_at)
            redis.call('PEXPIRE', key, window_ms + 1000)
            return {1, math.max(limit - 1, 0), reset_at}
        end

        if count >= limit then
            return {0, 0, reset_at}
        end

        count = redis.call('HINCRBY', key, 'count', 1)
        return {1, limit - count, reset_at}
        "#,
    )
});

/// 写入时间未变时删除结果键和时间键, 返回 1 表示已删除
static REMOVE_IF_STALE_SCRIPT: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r#"
        local stored_at = redis.call('GET', KEYS[2])
        if stored_at and tonumber(stored_at) == tonumber(ARGV[1]) then
            redis.call('DEL', KEYS[1], KEYS[2])
            return 1
        end
        return 0
        "#,
    )
});

/// Redis 限流表, 多实例共享计数
pub struct RedisRateLimitStore {
    redis: Arc<RedisClient>,
}

impl RedisRateLimitStore {
    pub fn new(redis: Arc<RedisClient>) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl RateLimitStore for RedisRateLimitStore {
    async fn consume(
        &self,
        key: &str,
        limit: u32,
        window_ms: i64,
        now_ms: i64,
    ) -> StoreResult<RateLimitDecision> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        let (allowed, remaining, reset_at): (i64, i64, i64) = CONSUME_SCRIPT
            .key(redis_rate_limit_key(key))
            .arg(limit)
            .arg(window_ms)
            .arg(now_ms)
            .invoke_async(&mut conn)
            .await?;

        Ok(RateLimitDecision {
            allowed: allowed == 1,
            remaining: remaining.max(0) as u32,
            reset_at,
        })
    }

    async fn sweep(&self, _now_ms: i64) -> StoreResult<usize> {
        // 过期由 PEXPIRE 处理
        Ok(0)
    }
}

/// Redis 分析缓存
///
/// 每个条目占两个键: `analysis:{family}` 存结果 JSON,
/// `analysis:{family}_timestamp` 存写入时间, 方便按前缀排查。
pub struct RedisAnalysisStore {
    redis: Arc<RedisClient>,
}

impl RedisAnalysisStore {
    pub fn new(redis: Arc<RedisClient>) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl AnalysisStore for RedisAnalysisStore {
    async fn load(&self, family: &str) -> StoreResult<Option<CachedAnalysis>> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        let (payload, stored_at): (Option<String>, Option<i64>) = redis::cmd("MGET")
            .arg(analysis_payload_key(family))
            .arg(analysis_timestamp_key(family))
            .query_async(&mut conn)
            .await?;

        match (payload, stored_at) {
            (Some(json), Some(stored_at)) => {
                let payload = serde_json::from_str(&json)?;
                Ok(Some(CachedAnalysis::new(payload, stored_at)))
            }
            _ => Ok(None),
        }
    }

    async fn save(&self, family: &str, entry: &CachedAnalysis) -> StoreResult<()> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        let json = serde_json::to_string(&entry.payload)?;
        redis::pipe()
            .atomic()
            .set(analysis_payload_key(family), json)
            .set(analysis_timestamp_key(family), entry.stored_at)
            .query_async::<()>(&mut conn)
            .await?;

        Ok(())
    }

    async fn remove_if_stale(&self, family: &str, stored_at: i64) -> StoreResult<bool> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        let removed: i64 = REMOVE_IF_STALE_SCRIPT
            .key(analysis_payload_key(family))
            .key(analysis_timestamp_key(family))
            .arg(stored_at)
            .invoke_async(&mut conn)
            .await?;

        Ok(removed == 1)
    }

    async fn sweep(&self, now_ms: i64, ttl_ms: i64) -> StoreResult<usize> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        // 游标遍历时间戳键
        let mut keys: Vec<String> = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(analysis_timestamp_pattern())
                .arg("COUNT")
                .arg(200)
                .query_async(&mut conn)
                .await?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        let mut removed = 0;
        for key in keys {
            let stored_at: Option<i64> = conn.get(&key).await?;
            let Some(stored_at) = stored_at else {
                continue;
            };
            if now_ms - stored_at < ttl_ms {
                continue;
            }
            let Some(family) = family_from_timestamp_key(&key) else {
                continue;
            };

            let deleted: i64 = REMOVE_IF_STALE_SCRIPT
                .key(analysis_payload_key(family))
                .key(&key)
                .arg(stored_at)
                .invoke_async(&mut conn)
                .await?;
            removed += deleted as usize;
        }

        Ok(removed)
    }
}
