/// LLM Client: the single point of entry for chat-completion calls.
///
/// Speaks the OpenAI-compatible chat-completions protocol shared by the
/// supported providers. One attempt per call: callers own fallback policy.
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

const DEEPSEEK_API_URL: &str = "https://api.deepseek.com/v1/chat/completions";
const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    DeepSeek,
    OpenAi,
}

impl LlmProvider {
    pub fn endpoint(&self) -> &'static str {
        match self {
            LlmProvider::DeepSeek => DEEPSEEK_API_URL,
            LlmProvider::OpenAi => OPENAI_API_URL,
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::DeepSeek => "deepseek-chat",
            LlmProvider::OpenAi => "gpt-4o-mini",
        }
    }

    /// Provider-specific environment variable holding the API key.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            LlmProvider::DeepSeek => "DEEPSEEK_API_KEY",
            LlmProvider::OpenAi => "OPENAI_API_KEY",
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmProvider::DeepSeek => f.write_str("deepseek"),
            LlmProvider::OpenAi => f.write_str("openai"),
        }
    }
}

impl FromStr for LlmProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deepseek" => Ok(LlmProvider::DeepSeek),
            "openai" => Ok(LlmProvider::OpenAi),
            other => anyhow::bail!("LLM_PROVIDER must be 'deepseek' or 'openai', got '{other}'"),
        }
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Sampling parameters for one completion.
#[derive(Debug, Clone, Copy)]
pub struct CompletionParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    /// Some providers answer 200 with an error payload.
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// Chat-completion client bound to one provider, key and model.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl LlmClient {
    pub fn new(provider: LlmProvider, api_key: String, model: Option<String>, timeout: Duration) -> Self {
        Self::with_endpoint(
            provider.endpoint(),
            api_key,
            model.unwrap_or_else(|| provider.default_model().to_string()),
            timeout,
        )
    }

    /// Client for an explicit endpoint URL (self-hosted gateways, tests).
    pub fn with_endpoint(
        endpoint: impl Into<String>,
        api_key: String,
        model: String,
        timeout: Duration,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            endpoint: endpoint.into(),
            api_key,
            model,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends one system + user exchange and returns the assistant's text.
    pub async fn complete(
        &self,
        system: &str,
        user: &str,
        params: CompletionParams,
    ) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ChatResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .map(|e| error_message(&e))
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&body)?;

        if let Some(error) = parsed.error {
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: error_message(&error),
            });
        }

        if let Some(usage) = &parsed.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(LlmError::EmptyContent)
    }
}

/// Error payloads come as `{"message": ...}` objects or bare strings.
fn error_message(error: &Value) -> String {
    error
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| error.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::json;

    const PARAMS: CompletionParams = CompletionParams {
        max_tokens: 1000,
        temperature: 0.8,
    };

    async fn serve(status: StatusCode, body: Value) -> (String, tokio::task::JoinHandle<()>) {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(move |Json(request): Json<Value>| {
                let body = body.clone();
                async move {
                    assert_eq!(request["messages"][0]["role"], "system");
                    assert_eq!(request["messages"][1]["role"], "user");
                    (status, Json(body))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/v1/chat/completions"), server)
    }

    fn client(endpoint: String) -> LlmClient {
        LlmClient::with_endpoint(
            endpoint,
            "test-key".to_string(),
            "deepseek-chat".to_string(),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let (url, server) = serve(
            StatusCode::OK,
            json!({
                "choices": [{"message": {"role": "assistant", "content": "# Roasted"}}],
                "usage": {"prompt_tokens": 10, "completion_tokens": 3}
            }),
        )
        .await;

        let text = client(url).complete("sys", "user", PARAMS).await.unwrap();
        assert_eq!(text, "# Roasted");
        server.abort();
    }

    #[tokio::test]
    async fn test_error_payload_with_200_is_api_error() {
        let (url, server) = serve(
            StatusCode::OK,
            json!({"error": {"message": "Authentication Fails"}}),
        )
        .await;

        let err = client(url).complete("sys", "user", PARAMS).await.unwrap_err();
        match err {
            LlmError::Api { message, .. } => assert_eq!(message, "Authentication Fails"),
            other => panic!("expected Api error, got {other:?}"),
        }
        server.abort();
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let (url, server) = serve(
            StatusCode::UNAUTHORIZED,
            json!({"error": {"message": "invalid api key"}}),
        )
        .await;

        let err = client(url).complete("sys", "user", PARAMS).await.unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 401, .. }));
        server.abort();
    }

    #[tokio::test]
    async fn test_empty_choices_is_empty_content() {
        let (url, server) = serve(StatusCode::OK, json!({"choices": []})).await;
        let err = client(url).complete("sys", "user", PARAMS).await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyContent));
        server.abort();
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        let err = client("http://127.0.0.1:9/v1/chat/completions".to_string())
            .complete("sys", "user", PARAMS)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Http(_)));
    }

    #[test]
    fn test_provider_defaults() {
        assert_eq!(LlmProvider::DeepSeek.default_model(), "deepseek-chat");
        assert!(LlmProvider::OpenAi.endpoint().contains("openai.com"));
        assert_eq!("OpenAI".parse::<LlmProvider>().unwrap(), LlmProvider::OpenAi);
    }

    #[test]
    fn test_error_message_accepts_string_or_object() {
        assert_eq!(error_message(&json!("boom")), "boom");
        assert_eq!(error_message(&json!({"message": "bad"})), "bad");
    }
}
