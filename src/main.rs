use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trustright::{
    AppState,
    analysis::{Analyzer, OpenAiAnalyzer, UnavailableAnalyzer},
    build_router,
    cache::{
        AnalysisCache, AnalysisStore, Clock, MemoryAnalysisStore, MemoryRateLimitStore,
        RateLimitStore, RateLimiter, RedisAnalysisStore, RedisRateLimitStore, SystemClock,
        spawn_sweeper,
    },
    config::Config,
    database::{MemoryRepository, PgRepository, Repository},
};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // 限流表和分析缓存: 配置了 Redis 则多实例共享
    let (rate_store, analysis_store): (Arc<dyn RateLimitStore>, Arc<dyn AnalysisStore>) =
        match &config.redis_url {
            Some(url) => {
                let client = Arc::new(
                    redis::Client::open(url.as_str()).expect("Failed to create Redis client"),
                );
                tracing::info!("Using Redis for rate limits and analysis cache");
                (
                    Arc::new(RedisRateLimitStore::new(client.clone())),
                    Arc::new(RedisAnalysisStore::new(client)),
                )
            }
            None => {
                tracing::warn!("REDIS_URL not set, rate limits and cache are per instance");
                (
                    Arc::new(MemoryRateLimitStore::new()),
                    Arc::new(MemoryAnalysisStore::new()),
                )
            }
        };

    let limiter = RateLimiter::new(rate_store, clock.clone());
    let cache = AnalysisCache::new(analysis_store, clock, config.cache_ttl());

    // 设置数据库连接池
    let repository: Arc<dyn Repository> = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .after_connect(|conn, _meta| {
                    Box::pin(async move {
                        conn.execute("SET application_name = 'trustright_backend';")
                            .await?;
                        Ok(())
                    })
                })
                .connect(url)
                .await
                .expect("Failed to connect to Postgres");
            Arc::new(PgRepository::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory repository");
            Arc::new(MemoryRepository::new())
        }
    };

    let analyzer: Arc<dyn Analyzer> = match &config.openai_api_key {
        Some(key) => Arc::new(
            OpenAiAnalyzer::new(
                key.clone(),
                config.openai_model.clone(),
                config.openai_base_url.clone(),
            )
            .expect("Failed to build HTTP client"),
        ),
        None => {
            tracing::warn!("OPENAI_API_KEY not set, analyses will return demo reports");
            Arc::new(UnavailableAnalyzer)
        }
    };

    spawn_sweeper(cache.clone(), limiter.clone(), config.cache_sweep_interval());

    let state = AppState::new(config.clone(), limiter, cache, analyzer, repository);
    let app = build_router(state);

    // 启动服务器
    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
