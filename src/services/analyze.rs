use crate::{
    AppState,
    analysis::{WebsiteAnalysis, fallback_analysis},
    database::WebsiteRecord,
    domain::extract_domain,
    error::AppError,
    utils::Claims,
};

/// 一次分析请求的结果
#[derive(Debug, Clone)]
pub struct AnalyzeOutcome {
    pub analysis: WebsiteAnalysis,
    pub website_id: Option<i32>,
    pub from_cache: bool,
    pub is_demo: bool,
    pub searches_remaining: i32,
}

/// 限流计数使用的身份, 没有邮箱时退回用户 ID
fn rate_limit_identity(claims: &Claims) -> &str {
    if claims.email.is_empty() {
        &claims.sub
    } else {
        &claims.email
    }
}

/// 分析一个网站
///
/// 顺序: 限流, 校验 URL, 检查订阅额度, 查缓存, 调用分析服务, 落库, 扣减额度。
/// 分析服务失败时返回兜底报告, 不缓存、不落库、不扣额度。
pub async fn analyze_website(
    state: &AppState,
    claims: &Claims,
    url: &str,
) -> Result<AnalyzeOutcome, AppError> {
    let decision = state
        .limiter
        .check(&state.analyze_limit, rate_limit_identity(claims))
        .await;
    if !decision.allowed {
        return Err(AppError::RateLimited(decision));
    }

    let url = url.trim();
    if url.is_empty() {
        return Err(AppError::Validation("URL is required".to_string()));
    }
    let domain = extract_domain(url)
        .ok_or_else(|| AppError::Validation(format!("Invalid URL: {}", url)))?;

    let subscription = match state.repository.find_subscription(&claims.sub).await? {
        Some(subscription) if subscription.is_active => subscription,
        _ => return Err(AppError::Forbidden("No active subscription".to_string())),
    };
    if subscription.is_exhausted() {
        return Err(AppError::QuotaExceeded {
            limit: subscription.searches_limit,
            used: subscription.searches_used,
        });
    }

    let (analysis, from_cache) = match state.cache.get::<WebsiteAnalysis>(&domain).await {
        Some(cached) => {
            tracing::info!("Serving cached analysis for {}", domain);
            (cached, true)
        }
        None => match state.analyzer.analyze(url, &domain).await {
            Ok(analysis) => {
                state.cache.put(&domain, &analysis).await;
                (analysis, false)
            }
            Err(e) => {
                tracing::warn!("Analysis failed for {}, returning demo report: {}", domain, e);
                return Ok(AnalyzeOutcome {
                    analysis: fallback_analysis(&domain),
                    website_id: None,
                    from_cache: false,
                    is_demo: true,
                    searches_remaining: subscription.remaining(),
                });
            }
        },
    };

    let website_id = match state
        .repository
        .upsert_website(&WebsiteRecord::from_analysis(&domain, &analysis))
        .await
    {
        Ok(id) => Some(id),
        Err(e) => {
            tracing::error!("Failed to store website {}: {}", domain, e);
            None
        }
    };

    if let Some(id) = website_id {
        if let Err(e) = state.repository.record_search(&claims.sub, id, url).await {
            tracing::error!("Failed to record search for {}: {}", claims.sub, e);
        }
    }

    let used = match state.repository.increment_usage(&claims.sub).await {
        Ok(used) => used,
        Err(e) => {
            tracing::error!("Failed to increment usage for {}: {}", claims.sub, e);
            subscription.searches_used + 1
        }
    };

    Ok(AnalyzeOutcome {
        analysis,
        website_id,
        from_cache,
        is_demo: false,
        searches_remaining: subscription.searches_limit - used,
    })
}
