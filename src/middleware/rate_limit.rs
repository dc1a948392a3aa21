use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::{
    cache::{RateLimitRule, RateLimiter},
    error::AppError,
    utils::{Claims, client_ip},
};

/// 挂在某组路由上的限流规则
#[derive(Clone)]
pub struct RouteLimit {
    pub limiter: RateLimiter,
    pub rule: RateLimitRule,
}

impl RouteLimit {
    pub fn new(limiter: RateLimiter, rule: RateLimitRule) -> Self {
        Self { limiter, rule }
    }
}

/// 已登录用户按邮箱计数, 否则按客户端 IP
fn identity(req: &Request<Body>) -> String {
    match req.extensions().get::<Claims>() {
        Some(claims) if !claims.email.is_empty() => claims.email.clone(),
        Some(claims) => claims.sub.clone(),
        None => client_ip(req),
    }
}

pub async fn rate_limit(
    State(route): State<RouteLimit>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let id = identity(&req);
    tracing::debug!("Rate limit check {} for {}", route.rule.namespace, id);

    let decision = route.limiter.check(&route.rule, &id).await;
    if !decision.allowed {
        return Err(AppError::RateLimited(decision));
    }

    Ok(next.run(req).await)
}
