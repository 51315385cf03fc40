//! DashScope (Qwen) text-generation client.

use crate::agent::provider::{build_prompt, AnswerProvider};
use crate::errors::InsightError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Longest slice of a non-JSON error body carried into the answer text.
const MAX_ERROR_DETAIL_CHARS: usize = 200;

/// Configuration for the DashScope client.
#[derive(Debug, Clone)]
pub struct QwenConfig {
    pub base_url: String,
    pub model_name: String,
    pub api_key: String,
    pub timeout_seconds: u64,
}

/// DashScope generation request.
#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    model: &'a str,
    input: GenerationInput<'a>,
    parameters: GenerationParameters,
}

#[derive(Debug, Serialize)]
struct GenerationInput<'a> {
    prompt: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationParameters {
    result_format: &'static str,
}

/// DashScope generation response.
#[derive(Debug, Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    output: Option<GenerationOutput>,
    #[serde(default)]
    request_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerationOutput {
    #[serde(default)]
    text: Option<String>,
}

/// Error body returned with a non-success status.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Answer provider backed by the DashScope text-generation API.
pub struct QwenProvider {
    config: QwenConfig,
    http_client: reqwest::Client,
}

impl QwenProvider {
    /// Create a client. The API key is passed in explicitly; this type never
    /// reads the environment.
    pub fn new(config: QwenConfig) -> Result<Self, InsightError> {
        if config.api_key.trim().is_empty() {
            return Err(InsightError::Config(
                "DashScope API key is empty".to_string(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| InsightError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/api/v1/services/aigc/text-generation/generation",
            self.config.base_url.trim_end_matches('/')
        )
    }

    async fn generate(&self, prompt: &str) -> Result<String, InsightError> {
        let request = GenerationRequest {
            model: &self.config.model_name,
            input: GenerationInput { prompt },
            parameters: GenerationParameters {
                result_format: "text",
            },
        };

        debug!("Sending generation request ({} chars)", prompt.len());

        let response = self
            .http_client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let detail = if e.is_timeout() {
                    format!("request timed out after {}s", self.config.timeout_seconds)
                } else if e.is_connect() {
                    format!("cannot connect to {}", self.config.base_url)
                } else {
                    e.to_string()
                };
                call_error(detail)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let parsed: GenerationResponse = response
            .json()
            .await
            .map_err(|e| call_error(format!("failed to parse response: {}", e)))?;

        if let Some(id) = &parsed.request_id {
            debug!("DashScope request id: {}", id);
        }

        parsed
            .output
            .and_then(|o| o.text)
            .ok_or_else(|| call_error("response contained no text".to_string()))
    }
}

#[async_trait]
impl AnswerProvider for QwenProvider {
    async fn answer(&self, question: &str, context: Option<&str>) -> Result<String, InsightError> {
        let prompt = build_prompt(question, context);
        self.generate(&prompt).await
    }

    fn model_name(&self) -> &str {
        &self.config.model_name
    }
}

/// Transport or decoding failure.
fn call_error(detail: String) -> InsightError {
    InsightError::AnswerProvider(format!("调用通义千问API时出错: {}", detail))
}

/// Non-success HTTP status; prefers the API's own error message.
fn status_error(status: reqwest::StatusCode, body: &str) -> InsightError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| match (b.code, b.message) {
            (_, Some(message)) if !message.is_empty() => Some(message),
            (Some(code), _) => Some(code),
            _ => None,
        })
        .unwrap_or_else(|| status_summary(status, body));

    InsightError::AnswerProvider(format!("API调用失败: {}", message))
}

/// One-line fallback for error bodies that are not DashScope JSON, such as a
/// gateway HTML page. Markup-only lines are skipped.
fn status_summary(status: reqwest::StatusCode, body: &str) -> String {
    let detail = body
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('<'))
        .map(|line| line.chars().take(MAX_ERROR_DETAIL_CHARS).collect::<String>());

    match detail {
        Some(detail) => format!("{} ({})", status, detail),
        None => status.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> QwenConfig {
        QwenConfig {
            base_url: "https://dashscope.aliyuncs.com/".to_string(),
            model_name: "qwen-max".to_string(),
            api_key: "sk-test".to_string(),
            timeout_seconds: 5,
        }
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let mut cfg = config();
        cfg.api_key = "  ".to_string();
        assert!(matches!(QwenProvider::new(cfg), Err(InsightError::Config(_))));
    }

    #[test]
    fn test_endpoint() {
        let provider = QwenProvider::new(config()).unwrap();
        assert_eq!(
            provider.endpoint(),
            "https://dashscope.aliyuncs.com/api/v1/services/aigc/text-generation/generation"
        );
        assert_eq!(provider.model_name(), "qwen-max");
    }

    #[test]
    fn test_request_serialization() {
        let request = GenerationRequest {
            model: "qwen-max",
            input: GenerationInput { prompt: "hi" },
            parameters: GenerationParameters {
                result_format: "text",
            },
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "qwen-max");
        assert_eq!(json["input"]["prompt"], "hi");
        assert_eq!(json["parameters"]["result_format"], "text");
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{
            "output": {"text": "供应商A", "finish_reason": "stop"},
            "usage": {"input_tokens": 10, "output_tokens": 3},
            "request_id": "abc"
        }"#;
        let parsed: GenerationResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.output.and_then(|o| o.text).as_deref(), Some("供应商A"));
    }

    #[test]
    fn test_status_error_uses_api_message() {
        let body =
            r#"{"code":"InvalidApiKey","message":"Invalid API-key provided.","request_id":"x"}"#;
        let err = status_error(reqwest::StatusCode::UNAUTHORIZED, body);
        assert_eq!(err.to_string(), "API调用失败: Invalid API-key provided.");
    }

    #[test]
    fn test_status_error_falls_back_to_status() {
        let err = status_error(reqwest::StatusCode::BAD_GATEWAY, "");
        assert!(err.to_string().starts_with("API调用失败: 502"));
    }

    #[test]
    fn test_status_error_html_body_stays_on_one_line() {
        let body = "<html>\r\n<head><title>502 Bad Gateway</title></head>\r\n<body>\r\n\
                    <center><h1>502 Bad Gateway</h1></center>\r\n<hr><center>nginx</center>\r\n\
                    </body>\r\n</html>\r\n";
        let err = status_error(reqwest::StatusCode::BAD_GATEWAY, body);
        let message = err.to_string();

        assert_eq!(message, "API调用失败: 502 Bad Gateway");
        assert!(!message.contains('\n'));
    }

    #[test]
    fn test_status_error_plain_body_is_truncated() {
        let body = format!("upstream overloaded {}\nsecond line", "x".repeat(500));
        let err = status_error(reqwest::StatusCode::SERVICE_UNAVAILABLE, &body);
        let message = err.to_string();

        assert!(message.starts_with("API调用失败: 503 Service Unavailable (upstream overloaded"));
        assert!(!message.contains("second line"));
        assert!(message.chars().count() < MAX_ERROR_DETAIL_CHARS + 50);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_provider_error() {
        let mut cfg = config();
        // Port 9 (discard) on localhost is normally closed.
        cfg.base_url = "http://127.0.0.1:9".to_string();
        let provider = QwenProvider::new(cfg).unwrap();

        let err = provider.answer("Q", None).await.unwrap_err();
        assert!(matches!(err, InsightError::AnswerProvider(_)));
        assert!(err.to_string().starts_with("调用通义千问API时出错"));
    }
}
