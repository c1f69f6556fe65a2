//! OpenAI-compatible chat completion backend.
//!
//! Works against any provider exposing `POST {base_url}/chat/completions`
//! (Together AI, OpenAI, Groq, vLLM, Ollama, ...). Each prompt is sent as a
//! single user message.

use async_trait::async_trait;
use cok_application::ports::completion::{CompletionBackend, CompletionError};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.together.xyz/v1";
pub const DEFAULT_MODEL: &str = "meta-llama/Llama-3-70b-chat-hf";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Completion backend over an OpenAI-compatible HTTP API
pub struct OpenAiCompatibleBackend {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiCompatibleBackend {
    /// `timeout` bounds each HTTP request; the pipeline applies its own
    /// per-attempt timeout on top.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, CompletionError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("chain-of-knowledge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CompletionError::ProviderError(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// Map an HTTP status to the backend error taxonomy.
fn status_error(status: StatusCode, body: &str) -> CompletionError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => CompletionError::RateLimited,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => CompletionError::Timeout,
        _ => CompletionError::ProviderError(format!(
            "HTTP {}: {}",
            status.as_u16(),
            body.chars().take(200).collect::<String>()
        )),
    }
}

#[async_trait]
impl CompletionBackend for OpenAiCompatibleBackend {
    async fn complete(
        &self,
        prompt: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String, CompletionError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
            max_tokens,
        };

        debug!(
            "POST {} (model={}, temperature={})",
            self.endpoint(),
            self.model,
            temperature
        );

        let mut builder = self.http.post(self.endpoint()).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                CompletionError::Timeout
            } else {
                CompletionError::ProviderError(format!("Request failed: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::ProviderError(format!("Malformed response: {}", e)))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CompletionError::ProviderError("Response had no choices".to_string()))
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_error(StatusCode::TOO_MANY_REQUESTS, ""),
            CompletionError::RateLimited
        );
        assert_eq!(
            status_error(StatusCode::GATEWAY_TIMEOUT, ""),
            CompletionError::Timeout
        );
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "bad key"),
            CompletionError::ProviderError(msg) if msg.contains("401") && msg.contains("bad key")
        ));
    }

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: "m",
            messages: [ChatMessage {
                role: "user",
                content: "hi",
            }],
            temperature: 0.3,
            max_tokens: 16,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
        assert_eq!(json["max_tokens"], 16);
    }

    #[test]
    fn test_response_parsing() {
        let body: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"Paris"}}]}"#,
        )
        .unwrap();
        assert_eq!(body.choices[0].message.content.as_deref(), Some("Paris"));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let backend =
            OpenAiCompatibleBackend::new("http://localhost:8000/v1/", "m", None, Duration::from_secs(1))
                .unwrap();
        assert_eq!(backend.endpoint(), "http://localhost:8000/v1/chat/completions");
    }
}
