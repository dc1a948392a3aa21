use url::Url;

/// 从 URL 中提取主机名: 去掉协议、路径、端口, 以及开头的 `www.`
///
/// 没有协议的输入按 `https://` 处理。无法得到主机名时返回 `None`。
pub fn extract_domain(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parsed = if trimmed.contains("://") {
        Url::parse(trimmed)
    } else {
        Url::parse(&format!("https://{}", trimmed))
    }
    .ok()?;

    let host = parsed.host_str()?.trim_end_matches('.').to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}
