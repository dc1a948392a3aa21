use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub jwt_secret: String,
    pub admin_key: String,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub analyze_rate_limit: u32,
    pub analyze_rate_window_secs: u64,
    pub admin_rate_limit: u32,
    pub admin_rate_window_secs: u64,
    pub cache_ttl_secs: u64,
    pub cache_sweep_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            api_base_uri: "/api".to_string(),
            jwt_secret: String::new(),
            admin_key: String::new(),
            database_url: None,
            redis_url: None,
            openai_api_key: None,
            openai_model: "gpt-4o-search-preview".to_string(),
            openai_base_url: "https://api.openai.com/v1".to_string(),
            analyze_rate_limit: 5,
            analyze_rate_window_secs: 60,
            admin_rate_limit: 20,
            admin_rate_window_secs: 60,
            cache_ttl_secs: 24 * 60 * 60,
            cache_sweep_interval_secs: 60 * 60,
        }
    }
}

/// 读取必填变量
fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

/// 空字符串按未设置处理
fn optional(name: &'static str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let defaults = Config::default();
        Ok(Config {
            server_host: optional("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parsed("SERVER_PORT", defaults.server_port)?,
            api_base_uri: optional("API_BASE_URI").unwrap_or(defaults.api_base_uri),
            jwt_secret: required("JWT_SECRET")?,
            admin_key: required("ADMIN_KEY")?,
            database_url: optional("DATABASE_URL"),
            redis_url: optional("REDIS_URL"),
            openai_api_key: optional("OPENAI_API_KEY"),
            openai_model: optional("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            openai_base_url: optional("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            analyze_rate_limit: parsed("ANALYZE_RATE_LIMIT", defaults.analyze_rate_limit)?,
            analyze_rate_window_secs: parsed(
                "ANALYZE_RATE_WINDOW",
                defaults.analyze_rate_window_secs,
            )?,
            admin_rate_limit: parsed("ADMIN_RATE_LIMIT", defaults.admin_rate_limit)?,
            admin_rate_window_secs: parsed("ADMIN_RATE_WINDOW", defaults.admin_rate_window_secs)?,
            cache_ttl_secs: parsed("CACHE_TTL", defaults.cache_ttl_secs)?,
            cache_sweep_interval_secs: parsed(
                "CACHE_SWEEP_INTERVAL",
                defaults.cache_sweep_interval_secs,
            )?,
        })
    }

    pub fn analyze_rate_window(&self) -> Duration {
        Duration::from_secs(self.analyze_rate_window_secs)
    }

    pub fn admin_rate_window(&self) -> Duration {
        Duration::from_secs(self.admin_rate_window_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn cache_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.cache_sweep_interval_secs.max(1))
    }
}
