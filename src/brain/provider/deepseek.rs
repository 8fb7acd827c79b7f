//! DeepSeek Provider
//!
//! Calls the OpenAI-compatible `/chat/completions` endpoint with bearer auth.
//! Non-streaming only: the bot sends the whole answer once it arrives.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::{ChatMessage, LLMRequest, LLMResponse, Provider, ProviderError, Result, TokenUsage};

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
pub const DEFAULT_MODEL: &str = "deepseek-chat";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// HTTP client for the DeepSeek chat API.
pub struct DeepSeekProvider {
    client: Client,
    api_key: Zeroizing<String>,
    base_url: String,
    model: String,
    temperature: Option<f32>,
}

impl std::fmt::Debug for DeepSeekProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepSeekProvider")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

impl DeepSeekProvider {
    /// Create a provider with the default endpoint, model and timeout.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_timeout(api_key, DEFAULT_TIMEOUT)
    }

    /// Create a provider whose requests give up after `timeout`.
    pub fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mathtutor/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: Zeroizing::new(api_key.into()),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn name(&self) -> &str {
        "deepseek"
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one user message and return the answer text.
    pub async fn simple_chat(&self, prompt: &str) -> Result<String> {
        self.complete(LLMRequest::user(prompt))
            .await
            .map(|response| response.content)
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn build_body(&self, request: LLMRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: request.model.unwrap_or_else(|| self.model.clone()),
            messages: request.messages,
            temperature: request.temperature.or(self.temperature),
            max_tokens: request.max_tokens,
            stream: false,
        }
    }
}

#[async_trait]
impl Provider for DeepSeekProvider {
    async fn complete(&self, request: LLMRequest) -> Result<LLMResponse> {
        let body = self.build_body(request);
        let started = Instant::now();

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.api_key.as_str())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: api_error_message(&text),
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        tracing::debug!(
            provider = self.name(),
            model = %parsed.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Completion received"
        );

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ProviderError::EmptyResponse)?;

        Ok(LLMResponse {
            content,
            model: parsed.model,
            usage: parsed.usage,
        })
    }
}

/// Pull `error.message` out of an OpenAI-style error body, falling back to the raw text.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn provider(server: &mockito::Server) -> DeepSeekProvider {
        DeepSeekProvider::new("test-key")
            .expect("client")
            .with_base_url(server.url())
    }

    #[tokio::test]
    async fn test_simple_chat_returns_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "deepseek-chat",
                "stream": false,
                "messages": [{"role": "user", "content": "2+2?"}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "id": "cmpl-1",
                    "model": "deepseek-chat",
                    "choices": [{"index": 0, "message": {"role": "assistant", "content": "4"}}],
                    "usage": {"prompt_tokens": 5, "completion_tokens": 1, "total_tokens": 6}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let answer = provider(&server).simple_chat("2+2?").await.expect("answer");
        assert_eq!(answer, "4");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_reports_usage() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(
                r#"{"model":"deepseek-chat","choices":[{"message":{"content":"ok"}}],
                   "usage":{"prompt_tokens":10,"completion_tokens":2,"total_tokens":12}}"#,
            )
            .create_async()
            .await;

        let response = provider(&server)
            .complete(LLMRequest::user("hi"))
            .await
            .expect("response");
        assert_eq!(response.model, "deepseek-chat");
        assert_eq!(response.usage.map(|u| u.total_tokens), Some(12));
    }

    #[tokio::test]
    async fn test_api_error_surfaces_status_and_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Authentication Fails","type":"authentication_error"}}"#)
            .create_async()
            .await;

        let err = provider(&server)
            .simple_chat("hi")
            .await
            .expect_err("should fail");
        assert!(
            matches!(&err, ProviderError::Api { status: 401, message } if message == "Authentication Fails"),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn test_no_choices_is_empty_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"model":"deepseek-chat","choices":[]}"#)
            .create_async()
            .await;

        let err = provider(&server)
            .simple_chat("hi")
            .await
            .expect_err("should fail");
        assert!(matches!(err, ProviderError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_garbage_body_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body("<html>gateway</html>")
            .create_async()
            .await;

        let err = provider(&server)
            .simple_chat("hi")
            .await
            .expect_err("should fail");
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let provider = DeepSeekProvider::new("k")
            .expect("client")
            .with_base_url("http://127.0.0.1:1");
        let err = provider.simple_chat("hi").await.expect_err("should fail");
        assert!(matches!(err, ProviderError::Network(_)), "{err:?}");
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let provider = DeepSeekProvider::new("k")
            .expect("client")
            .with_base_url("https://api.example.com/v1/");
        assert_eq!(provider.endpoint(), "https://api.example.com/v1/chat/completions");
    }

    #[test]
    fn test_debug_redacts_key() {
        let provider = DeepSeekProvider::new("sk-secret").expect("client");
        let debug = format!("{provider:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("deepseek-chat"));
    }

    #[test]
    fn test_request_overrides_defaults() {
        let provider = DeepSeekProvider::new("k")
            .expect("client")
            .with_temperature(Some(0.2));
        let body = provider.build_body(LLMRequest {
            model: Some("deepseek-reasoner".into()),
            ..LLMRequest::user("x")
        });
        assert_eq!(body.model, "deepseek-reasoner");
        assert_eq!(body.temperature, Some(0.2));
        assert!(!body.stream);
    }
}
