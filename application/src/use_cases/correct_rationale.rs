//! Rationale Corrector
//!
//! Rewrites one rationale against fused evidence. Runs even when the
//! evidence is empty, so every rationale takes the same path.

use crate::config::CompletionParams;
use crate::ports::completion::{CompletionBackend, CompletionError};
use crate::use_cases::shared::{DETERMINISTIC_TEMPERATURE, complete_with_retry};
use cok_domain::{FusedEvidence, Question, Rationale, RationaleId, StagePrompt};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Correction of {rationale_id} failed: {source}")]
pub struct CorrectionError {
    pub rationale_id: RationaleId,
    #[source]
    pub source: CompletionError,
}

/// Use case for grounding one rationale in evidence
pub struct CorrectRationaleUseCase {
    backend: Arc<dyn CompletionBackend>,
    params: CompletionParams,
}

impl CorrectRationaleUseCase {
    pub fn new(backend: Arc<dyn CompletionBackend>, params: CompletionParams) -> Self {
        Self { backend, params }
    }

    /// Produce the corrected successor of `rationale`.
    ///
    /// The answer is re-extracted from the new text by the same parser used
    /// for raw rationales. The input rationale is left untouched.
    pub async fn execute(
        &self,
        question: &Question,
        rationale: &Rationale,
        evidence: &FusedEvidence,
    ) -> Result<Rationale, CorrectionError> {
        let prompt =
            StagePrompt::correction(&question.render_with_choices(), rationale.text(), evidence);

        let text = complete_with_retry(
            self.backend.as_ref(),
            &prompt,
            DETERMINISTIC_TEMPERATURE,
            &self.params,
        )
        .await
        .map_err(|source| CorrectionError {
            rationale_id: rationale.id(),
            source,
        })?;

        let corrected = rationale.corrected(text);
        debug!(
            "{} corrected: '{}' -> '{}'",
            rationale.id(),
            rationale.extracted_answer(),
            corrected.extracted_answer()
        );
        Ok(corrected)
    }
}
