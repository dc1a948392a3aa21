#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use serde_json::Value;
use tower::ServiceExt;
use trustright::{
    AppState,
    analysis::{AnalysisError, Analyzer, WebsiteAnalysis},
    build_router,
    cache::{AnalysisCache, ManualClock, MemoryAnalysisStore, MemoryRateLimitStore, RateLimiter},
    config::Config,
    database::{MemoryRepository, Plan, Subscription},
    utils::generate_token,
};

pub const ADMIN_KEY: &str = "admin-key";
pub const START_MS: i64 = 1_000_000;

/// 固定返回结果的分析服务, 可切换为失败
#[derive(Default)]
pub struct StubAnalyzer {
    pub calls: AtomicUsize,
    pub failing: AtomicBool,
}

impl StubAnalyzer {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl Analyzer for StubAnalyzer {
    async fn analyze(&self, _url: &str, domain: &str) -> Result<WebsiteAnalysis, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(AnalysisError::EmptyResponse);
        }

        Ok(WebsiteAnalysis {
            company_name: format!("{} Inc", domain),
            privacy_policy_present: true,
            domain: domain.to_string(),
            trust_score: 64,
            ..WebsiteAnalysis::default()
        })
    }
}

pub struct TestApp {
    pub state: AppState,
    pub config: Config,
    pub repository: Arc<MemoryRepository>,
    pub analyzer: Arc<StubAnalyzer>,
    pub clock: Arc<ManualClock>,
}

pub fn test_config() -> Config {
    Config {
        jwt_secret: "test-secret".to_string(),
        admin_key: ADMIN_KEY.to_string(),
        ..Config::default()
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let clock = Arc::new(ManualClock::new(START_MS));
        let repository = Arc::new(MemoryRepository::new());
        let analyzer = Arc::new(StubAnalyzer::default());

        let limiter = RateLimiter::new(Arc::new(MemoryRateLimitStore::new()), clock.clone());
        let cache = AnalysisCache::new(
            Arc::new(MemoryAnalysisStore::new()),
            clock.clone(),
            config.cache_ttl(),
        );
        let state = AppState::new(
            config.clone(),
            limiter,
            cache,
            analyzer.clone(),
            repository.clone(),
        );

        Self {
            state,
            config,
            repository,
            analyzer,
            clock,
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub async fn subscribe(&self, user_id: &str, plan: Plan) {
        self.repository
            .insert_subscription(Subscription::new(user_id, plan))
            .await;
    }

    pub fn token(&self, user_id: &str, email: &str) -> String {
        let (token, _) =
            generate_token(user_id, email, chrono::Duration::hours(1), &self.config).unwrap();
        token
    }

    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router().oneshot(req).await.unwrap()
    }

    pub async fn analyze(&self, token: &str, url: &str) -> Response<Body> {
        let body = serde_json::json!({ "url": url }).to_string();
        self.send(
            Request::builder()
                .method("POST")
                .uri("/api/analyze")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    pub async fn get(&self, uri: &str, bearer: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(bearer) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", bearer));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }
}

pub async fn json_body(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
