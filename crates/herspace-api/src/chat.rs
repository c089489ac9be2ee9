//! Client for an OpenAI-compatible chat-completion endpoint.
//!
//! One request per call, no streaming and no retries. Every failure comes
//! back as a [`ChatError`] and callers substitute their own fallback text.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_MAX_TOKENS: u32 = 500;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat completion is not configured")]
    NotConfigured,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Api { status: reqwest::StatusCode, body: String },

    #[error("API returned no content")]
    EmptyResponse,
}

#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Without a key every call fails with [`ChatError::NotConfigured`].
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    config: ChatConfig,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatClient {
    pub fn new(config: ChatConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Sends one system + user exchange and returns the assistant's reply.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, ChatError> {
        let api_key = self.config.api_key.as_deref().ok_or(ChatError::NotConfigured)?;
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        let request = CompletionRequest {
            model: &self.config.model,
            messages: [
                Message { role: "system", content: system },
                Message { role: "user", content: user },
            ],
            max_tokens: self.config.max_tokens,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        debug!(status = %status, "chat completion response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "chat completion failed");
            return Err(ChatError::Api { status, body });
        }

        let parsed: CompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(ChatError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::StatusCode, routing::post};
    use serde_json::{Value, json};

    /// Serves one canned completion response and returns its base URL.
    async fn stub(status: StatusCode, body: Value) -> String {
        let app = Router::new().route(
            "/chat/completions",
            post(move || {
                let body = body.clone();
                async move { (status, Json(body)) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}")
    }

    fn client_for(base_url: String) -> ChatClient {
        ChatClient::new(ChatConfig {
            api_key: Some("sk-test".into()),
            base_url,
            ..ChatConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn reply_content_is_trimmed() {
        let base = stub(
            StatusCode::OK,
            json!({"choices": [{"message": {"role": "assistant", "content": "  Breathe slowly.\n"}}]}),
        )
        .await;
        let reply = client_for(base).complete("system", "hello").await.unwrap();
        assert_eq!(reply, "Breathe slowly.");
    }

    #[tokio::test]
    async fn server_error_is_an_api_error() {
        let base = stub(StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "boom"})).await;
        let err = client_for(base).complete("system", "hello").await.unwrap_err();
        match err {
            ChatError::Api { status, body } => {
                assert_eq!(status, reqwest::StatusCode::INTERNAL_SERVER_ERROR);
                assert!(body.contains("boom"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_or_blank_content_is_empty() {
        let base = stub(StatusCode::OK, json!({"choices": []})).await;
        let err = client_for(base).complete("system", "hello").await.unwrap_err();
        assert!(matches!(err, ChatError::EmptyResponse));

        let base = stub(StatusCode::OK, json!({"choices": [{"message": {"content": "   "}}]})).await;
        let err = client_for(base).complete("system", "hello").await.unwrap_err();
        assert!(matches!(err, ChatError::EmptyResponse));

        let base = stub(StatusCode::OK, json!({"choices": [{"message": {"content": null}}]})).await;
        let err = client_for(base).complete("system", "hello").await.unwrap_err();
        assert!(matches!(err, ChatError::EmptyResponse));
    }

    #[tokio::test]
    async fn missing_key_is_not_configured() {
        let client = ChatClient::new(ChatConfig::default()).unwrap();
        assert!(!client.is_configured());
        let err = client.complete("system", "hello").await.unwrap_err();
        assert!(matches!(err, ChatError::NotConfigured));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_http_error() {
        let client = ChatClient::new(ChatConfig {
            api_key: Some("sk-test".into()),
            base_url: "http://127.0.0.1:9".into(),
            ..ChatConfig::default()
        })
        .unwrap();
        let err = client.complete("system", "hello").await.unwrap_err();
        assert!(matches!(err, ChatError::Http(_)));
    }

    #[test]
    fn request_serializes_both_roles() {
        let request = CompletionRequest {
            model: "m",
            messages: [
                Message { role: "system", content: "be kind" },
                Message { role: "user", content: "hi" },
            ],
            max_tokens: 10,
            temperature: TEMPERATURE,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "hi");
        assert_eq!(value["max_tokens"], 10);
    }
}
