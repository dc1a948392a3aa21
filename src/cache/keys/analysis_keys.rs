/// 分析结果缓存键前缀
const ANALYSIS_PREFIX: &str = "analysis:";

/// 写入时间键后缀
const TIMESTAMP_SUFFIX: &str = "_timestamp";

/// 生成分析结果键: `analysis:{family}`
pub fn analysis_payload_key(family: &str) -> String {
    format!("{}{}", ANALYSIS_PREFIX, family)
}

/// 生成写入时间键: `analysis:{family}_timestamp`
pub fn analysis_timestamp_key(family: &str) -> String {
    format!("{}{}{}", ANALYSIS_PREFIX, family, TIMESTAMP_SUFFIX)
}

/// 匹配所有写入时间键
pub fn analysis_timestamp_pattern() -> String {
    format!("{}*{}", ANALYSIS_PREFIX, TIMESTAMP_SUFFIX)
}

/// 从写入时间键还原公司键
pub fn family_from_timestamp_key(key: &str) -> Option<&str> {
    key.strip_prefix(ANALYSIS_PREFIX)?
        .strip_suffix(TIMESTAMP_SUFFIX)
}
