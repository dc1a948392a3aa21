use serde::{Deserialize, Serialize};

use crate::analysis::WebsiteAnalysis;
use crate::services::AnalyzeOutcome;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub url: Option<String>,
}

/// 分析结果平铺在顶层, 附带额度和来源信息
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub analysis: WebsiteAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub searches_remaining: i32,
    pub from_cache: bool,
    pub is_demo: bool,
}

impl From<AnalyzeOutcome> for AnalyzeResponse {
    fn from(outcome: AnalyzeOutcome) -> Self {
        Self {
            analysis: outcome.analysis,
            id: outcome.website_id,
            searches_remaining: outcome.searches_remaining,
            from_cache: outcome.from_cache,
            is_demo: outcome.is_demo,
        }
    }
}
