//! Completion backend port
//!
//! Defines the single contract every language-model provider is driven through.

use async_trait::async_trait;
use thiserror::Error;

/// Errors a completion backend can report
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    #[error("Rate limited by provider")]
    RateLimited,

    #[error("Completion timed out")]
    Timeout,

    #[error("Provider error: {0}")]
    ProviderError(String),
}

/// Text-completion backend
///
/// This port defines how the application layer talks to a language model.
/// Implementations (adapters) live in the infrastructure layer; the pipeline
/// treats all providers identically through this one call.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Complete `prompt`, sampling at `temperature`, producing at most
    /// `max_tokens` tokens.
    async fn complete(
        &self,
        prompt: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String, CompletionError>;

    /// Short identifier for logs (e.g. the model name).
    fn name(&self) -> &str {
        "completion"
    }
}
