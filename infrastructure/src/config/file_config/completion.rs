//! Completion backend configuration from TOML (`[completion]` section)

use crate::llm::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use cok_application::{CompletionParams, RetryPolicy};
use cok_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw completion configuration from TOML
///
/// The API key itself is never stored in the file; `api_key_env` names the
/// environment variable holding it.
///
/// # Example
///
/// ```toml
/// [completion]
/// base_url = "https://api.together.xyz/v1"
/// model = "meta-llama/Llama-3-70b-chat-hf"
/// api_key_env = "TOGETHER_API_KEY"
/// timeout_seconds = 60
/// max_attempts = 3
/// initial_backoff_ms = 500
/// max_backoff_ms = 8000
/// cache = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCompletionConfig {
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,
    pub timeout_seconds: u64,
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    /// Memoize zero-temperature calls
    pub cache: bool,
}

impl Default for FileCompletionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key_env: "TOGETHER_API_KEY".to_string(),
            timeout_seconds: 60,
            max_attempts: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 8000,
            cache: true,
        }
    }
}

impl FileCompletionConfig {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn to_params(&self, max_tokens: u32) -> CompletionParams {
        CompletionParams {
            max_tokens,
            timeout: self.timeout(),
            retry: RetryPolicy {
                max_attempts: self.max_attempts,
                initial_backoff: Duration::from_millis(self.initial_backoff_ms),
                max_backoff: Duration::from_millis(self.max_backoff_ms),
            },
        }
    }

    pub fn issues(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.model.trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyModel,
                "completion.model: model name cannot be empty",
            ));
        }
        if self.timeout_seconds == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroTimeout,
                "completion.timeout_seconds cannot be 0",
            ));
        }
        if self.max_attempts == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroAttempts,
                "completion.max_attempts must be at least 1",
            ));
        }

        issues
    }
}
