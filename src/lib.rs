use std::sync::Arc;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};

pub mod analysis;
pub mod cache;
pub mod config;
pub mod database;
pub mod domain;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod utils;

use analysis::Analyzer;
use cache::{AnalysisCache, RateLimitRule, RateLimiter};
use config::Config;
use database::Repository;
use middleware::{RouteLimit, admin_middleware, auth_middleware, log_errors, rate_limit};

/// 分析接口限流命名空间
pub const ANALYZE_NAMESPACE: &str = "analyze";
/// 管理接口限流命名空间
pub const ADMIN_NAMESPACE: &str = "admin";

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub limiter: RateLimiter,
    pub cache: AnalysisCache,
    pub analyzer: Arc<dyn Analyzer>,
    pub repository: Arc<dyn Repository>,
    pub analyze_limit: RateLimitRule,
    pub admin_limit: RateLimitRule,
}

impl AppState {
    pub fn new(
        config: Config,
        limiter: RateLimiter,
        cache: AnalysisCache,
        analyzer: Arc<dyn Analyzer>,
        repository: Arc<dyn Repository>,
    ) -> Self {
        let analyze_limit = RateLimitRule::new(
            ANALYZE_NAMESPACE,
            config.analyze_rate_limit,
            config.analyze_rate_window(),
        );
        let admin_limit = RateLimitRule::new(
            ADMIN_NAMESPACE,
            config.admin_rate_limit,
            config.admin_rate_window(),
        );

        Self {
            config,
            limiter,
            cache,
            analyzer,
            repository,
            analyze_limit,
            admin_limit,
        }
    }
}

/// 组装全部路由
pub fn build_router(state: AppState) -> Router {
    // 需要用户登录的路由
    let user_routes = Router::new()
        .route("/analyze", post(routes::analyze::analyze))
        .route("/user/subscription", get(routes::user::subscription))
        .route("/user/searches", get(routes::user::searches))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    // 管理路由: 先校验密钥, 再按 IP 限流
    let admin_limit = RouteLimit::new(state.limiter.clone(), state.admin_limit.clone());
    let admin_routes = Router::new()
        .route("/admin/analytics", get(routes::admin::analytics))
        .route_layer(from_fn_with_state(admin_limit, rate_limit))
        .route_layer(from_fn_with_state(state.clone(), admin_middleware));

    let api = Router::new().merge(user_routes).merge(admin_routes);

    let base = state.config.api_base_uri.trim_end_matches('/');
    let router = if base.is_empty() {
        api
    } else {
        Router::new().nest(base, api)
    };

    let router = router.layer(from_fn(log_errors));

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    router.with_state(state)
}
