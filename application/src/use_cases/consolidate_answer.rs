//! Answer Consolidator
//!
//! Used only when consensus was not reached or not validated. One call sees
//! every corrected rationale and its reply is returned verbatim (trimmed).

use crate::config::CompletionParams;
use crate::ports::completion::{CompletionBackend, CompletionError};
use crate::use_cases::shared::{DETERMINISTIC_TEMPERATURE, complete_with_retry};
use cok_domain::{Rationale, StagePrompt};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConsolidationError {
    #[error("Consolidation call failed: {0}")]
    CallFailed(#[from] CompletionError),

    #[error("Consolidation returned an empty answer")]
    EmptyAnswer,
}

/// Use case for synthesizing a final answer
pub struct ConsolidateAnswerUseCase {
    backend: Arc<dyn CompletionBackend>,
    params: CompletionParams,
}

impl ConsolidateAnswerUseCase {
    pub fn new(backend: Arc<dyn CompletionBackend>, params: CompletionParams) -> Self {
        Self { backend, params }
    }

    /// `question` is the text shown to the model, options included.
    pub async fn execute(
        &self,
        question: &str,
        rationales: &[Rationale],
    ) -> Result<String, ConsolidationError> {
        let prompt = StagePrompt::consolidation(question, rationales);
        let answer = complete_with_retry(
            self.backend.as_ref(),
            &prompt,
            DETERMINISTIC_TEMPERATURE,
            &self.params,
        )
        .await?;

        let answer = answer.trim();
        if answer.is_empty() {
            return Err(ConsolidationError::EmptyAnswer);
        }
        Ok(answer.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cok_domain::RationaleId;
    use crate::use_cases::shared::test_support::ScriptedBackend;

    fn rationales() -> Vec<Rationale> {
        ["Answer: Paris", "Answer: Lyon", "Answer: Paris"]
            .iter()
            .enumerate()
            .map(|(i, t)| Rationale::raw(RationaleId(i), *t).corrected(*t))
            .collect()
    }

    #[tokio::test]
    async fn test_returns_reply_verbatim() {
        let backend = Arc::new(ScriptedBackend::fixed("  Paris, the capital city\n"));
        let consolidator = ConsolidateAnswerUseCase::new(backend.clone(), CompletionParams::default());

        let answer = consolidator
            .execute("What is the capital of France?", &rationales())
            .await
            .unwrap();

        assert_eq!(answer, "Paris, the capital city");
        let prompt = &backend.prompts()[0];
        assert!(prompt.contains("1. Answer: Paris"));
        assert!(prompt.contains("2. Answer: Lyon"));
        assert!(prompt.contains("3. Answer: Paris"));
    }

    #[tokio::test]
    async fn test_empty_reply_is_error() {
        let backend = Arc::new(ScriptedBackend::fixed("   "));
        let consolidator = ConsolidateAnswerUseCase::new(backend, CompletionParams::default());

        let err = consolidator.execute("Q?", &rationales()).await.unwrap_err();
        assert_eq!(err, ConsolidationError::EmptyAnswer);
    }
}
