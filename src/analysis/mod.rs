//! 网站透明度分析
//!
//! 外部 AI 服务的调用被抽象成 [`Analyzer`], 这里负责构造提示词、
//! 校验返回结构, 以及服务不可用时的兜底报告。

mod fallback;
mod model;
mod openai;
mod parse;
mod prompt;

use async_trait::async_trait;

pub use fallback::fallback_analysis;
pub use model::*;
pub use openai::OpenAiAnalyzer;
pub use parse::{clean_response, parse_analysis};
pub use prompt::{SYSTEM_PROMPT, build_prompt};

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Analysis provider is not configured")]
    Unavailable,
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Provider returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Provider returned an empty response")]
    EmptyResponse,
    #[error("Invalid JSON in response: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Invalid analysis structure: {0}")]
    InvalidStructure(&'static str),
}

/// 外部分析服务
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// 分析 `url` 对应的网站; `domain` 为规范化后的主机名
    async fn analyze(&self, url: &str, domain: &str) -> Result<WebsiteAnalysis, AnalysisError>;
}

/// 未配置 API 密钥时使用, 每次都返回 [`AnalysisError::Unavailable`]
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableAnalyzer;

#[async_trait]
impl Analyzer for UnavailableAnalyzer {
    async fn analyze(&self, _url: &str, _domain: &str) -> Result<WebsiteAnalysis, AnalysisError> {
        Err(AnalysisError::Unavailable)
    }
}
