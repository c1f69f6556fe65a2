//! Consensus Validator
//!
//! Mandatory gate before an early stop: one zero-temperature call asks
//! whether the majority answer is a reasonable response to the question.

use crate::config::CompletionParams;
use crate::ports::completion::{CompletionBackend, CompletionError};
use crate::use_cases::shared::{DETERMINISTIC_TEMPERATURE, complete_with_retry};
use cok_domain::{StagePrompt, is_affirmative};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// The validation call itself failed (not a negative verdict)
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Validation call failed: {0}")]
pub struct ValidationError(#[from] pub CompletionError);

/// Verdict with the raw reply kept for the transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub approved: bool,
    pub response: String,
}

/// Use case for validating a consensus candidate
pub struct ValidateConsensusUseCase {
    backend: Arc<dyn CompletionBackend>,
    params: CompletionParams,
}

impl ValidateConsensusUseCase {
    pub fn new(backend: Arc<dyn CompletionBackend>, params: CompletionParams) -> Self {
        Self { backend, params }
    }

    /// Ask whether `candidate_answer` is reasonable for `question`.
    pub async fn execute(
        &self,
        question: &str,
        candidate_answer: &str,
    ) -> Result<Validation, ValidationError> {
        let prompt = StagePrompt::validation(question, candidate_answer);
        let response = complete_with_retry(
            self.backend.as_ref(),
            &prompt,
            DETERMINISTIC_TEMPERATURE,
            &self.params,
        )
        .await?;

        let approved = is_affirmative(&response);
        debug!("Validator on '{}': {} ({})", candidate_answer, approved, response.trim());
        Ok(Validation { approved, response })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use crate::use_cases::shared::test_support::ScriptedBackend;

    #[tokio::test]
    async fn test_affirmative_reply_approves() {
        let backend = Arc::new(ScriptedBackend::fixed("YES"));
        let validator = ValidateConsensusUseCase::new(backend.clone(), CompletionParams::default());

        let verdict = validator
            .execute("What is the capital of France?", "Paris")
            .await
            .unwrap();

        assert!(verdict.approved);
        assert!(backend.prompts()[0]
            .starts_with("Is 'Paris' reasonable for 'What is the capital of France?'"));
        assert_eq!(backend.temperatures(), vec![0.0]);
    }

    #[tokio::test]
    async fn test_negative_reply_rejects() {
        let backend = Arc::new(ScriptedBackend::fixed("No. Banana is not a city."));
        let validator = ValidateConsensusUseCase::new(backend, CompletionParams::default());

        let verdict = validator.execute("What is the capital?", "Banana").await.unwrap();
        assert!(!verdict.approved);
    }

    #[tokio::test]
    async fn test_call_failure_is_an_error() {
        let backend = Arc::new(ScriptedBackend::new(|_, _| Err(CompletionError::Timeout)));
        let params = CompletionParams {
            retry: RetryPolicy::none(),
            ..CompletionParams::default()
        };
        let validator = ValidateConsensusUseCase::new(backend, params);

        let err = validator.execute("Q?", "A").await.unwrap_err();
        assert_eq!(err, ValidationError(CompletionError::Timeout));
    }
}
