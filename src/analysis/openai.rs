use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::model::WebsiteAnalysis;
use super::parse::parse_analysis;
use super::prompt::{SYSTEM_PROMPT, build_prompt};
use super::{AnalysisError, Analyzer};

/// 带联网搜索的对话模型一次调用可能超过一分钟
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// OpenAI chat completions 接口
pub struct OpenAiAnalyzer {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiAnalyzer {
    pub fn new(api_key: String, model: String, base_url: String) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl Analyzer for OpenAiAnalyzer {
    async fn analyze(&self, url: &str, domain: &str) -> Result<WebsiteAnalysis, AnalysisError> {
        tracing::info!("Requesting analysis for {} ({})", domain, self.model);

        let payload = json!({
            "model": self.model,
            "web_search_options": {},
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": build_prompt(url, domain) }
            ]
        });

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletion = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(AnalysisError::EmptyResponse)?;

        match parse_analysis(&content, domain) {
            Ok(analysis) => {
                tracing::info!("Analysis for {} succeeded (score {})", domain, analysis.trust_score);
                Ok(analysis)
            }
            Err(e) => {
                tracing::error!("Unusable analysis for {}: {}", domain, e);
                tracing::debug!("Raw response: {}", content);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer(base_url: String) -> OpenAiAnalyzer {
        OpenAiAnalyzer::new("sk-test".to_string(), "gpt-4o-search-preview".to_string(), base_url)
            .unwrap()
    }

    #[tokio::test]
    async fn parses_completion_content() {
        let mut server = mockito::Server::new_async().await;
        let content = r#"```json
{"company_name": "Target", "trustScore": 77, "lawsuits": []}
```"#;
        let body = json!({ "choices": [ { "message": { "role": "assistant", "content": content } } ] });
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let analysis = analyzer(server.url())
            .analyze("https://target.com", "target.com")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(analysis.company_name, "Target");
        assert_eq!(analysis.trust_score, 77);
        assert_eq!(analysis.domain, "target.com");
    }

    #[tokio::test]
    async fn upstream_errors_are_reported() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(503)
            .with_body("overloaded")
            .create_async()
            .await;

        let err = analyzer(server.url())
            .analyze("https://target.com", "target.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn empty_choices_are_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let err = analyzer(server.url())
            .analyze("https://target.com", "target.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyResponse));
    }
}
