/// 速率限制键前缀
const RATE_LIMIT_PREFIX: &str = "rate_limit:";

/// 按接口命名空间隔离调用方: `{namespace}:{identifier}`
pub fn rate_limit_key(namespace: &str, identifier: &str) -> String {
    format!("{}:{}", namespace, identifier)
}

/// Redis 中的完整键
pub fn redis_rate_limit_key(key: &str) -> String {
    format!("{}{}", RATE_LIMIT_PREFIX, key)
}
