//! Rationale Generator
//!
//! Samples k independent reasoning chains for a question. The temperature
//! and template are chosen once per question by the [`SamplingPolicy`] and
//! used for every call of the batch.

use crate::config::CompletionParams;
use crate::ports::completion::{CompletionBackend, CompletionError};
use crate::use_cases::shared::complete_with_retry;
use cok_domain::{
    PromptTemplate, Question, Rationale, RationaleId, SamplingDecision, SamplingPolicy,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("At least one rationale must be requested")]
    NothingRequested,

    #[error("{failed} of {requested} rationale generations failed: {last_error}")]
    GenerationFailed {
        failed: usize,
        requested: usize,
        last_error: CompletionError,
    },
}

/// Output of one generation batch
#[derive(Debug, Clone)]
pub struct GeneratedRationales {
    /// Exactly k raw rationales, in id order
    pub rationales: Vec<Rationale>,
    /// Temperature and template used for the whole batch
    pub decision: SamplingDecision,
    /// `name@vN` of the template
    pub template_id: String,
}

/// Use case for sampling raw rationales
pub struct GenerateRationalesUseCase {
    backend: Arc<dyn CompletionBackend>,
    policy: SamplingPolicy,
    params: CompletionParams,
}

impl GenerateRationalesUseCase {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        policy: SamplingPolicy,
        params: CompletionParams,
    ) -> Self {
        Self {
            backend,
            policy,
            params,
        }
    }

    /// Generate exactly `k` raw rationales, or fail.
    ///
    /// The k calls run concurrently. If any call exhausts its retries the
    /// whole batch fails with [`GenerationError::GenerationFailed`]; the
    /// batch is never silently shrunk.
    pub async fn execute(
        &self,
        question: &Question,
        k: usize,
    ) -> Result<GeneratedRationales, GenerationError> {
        if k == 0 {
            return Err(GenerationError::NothingRequested);
        }

        let decision = self.policy.decide(question);
        let template = PromptTemplate::for_reasoning(decision.template);
        let prompt = template.render(&question.render_with_choices());

        info!(
            "Generating {} rationales with {} at temperature {}",
            k,
            template.id(),
            decision.temperature
        );

        let mut join_set = JoinSet::new();
        for index in 0..k {
            let backend = Arc::clone(&self.backend);
            let prompt = prompt.clone();
            let params = self.params;
            let temperature = decision.temperature;

            join_set.spawn(async move {
                let result =
                    complete_with_retry(backend.as_ref(), &prompt, temperature, &params).await;
                (RationaleId(index), result)
            });
        }

        let mut slots: Vec<Option<Rationale>> = vec![None; k];
        let mut failed = 0;
        let mut last_error = None;

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((id, Ok(text))) => {
                    let rationale = Rationale::raw(id, text);
                    debug!("{} answered '{}'", id, rationale.extracted_answer());
                    slots[id.index()] = Some(rationale);
                }
                Ok((id, Err(e))) => {
                    warn!("{} generation failed: {}", id, e);
                    failed += 1;
                    last_error = Some(e);
                }
                Err(e) => {
                    warn!("Task join error: {}", e);
                    failed += 1;
                    last_error = Some(CompletionError::ProviderError(e.to_string()));
                }
            }
        }

        if failed > 0 {
            return Err(GenerationError::GenerationFailed {
                failed,
                requested: k,
                last_error: last_error.unwrap_or(CompletionError::Timeout),
            });
        }

        Ok(GeneratedRationales {
            rationales: slots.into_iter().flatten().collect(),
            decision,
            template_id: template.id(),
        })
    }
}
