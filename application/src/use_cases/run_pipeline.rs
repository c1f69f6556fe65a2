//! Run Pipeline use case
//!
//! Orchestrates one question end to end and owns its state machine:
//!
//! ```text
//! Init → Reasoning → RetrievalAndCorrection → ConsensusCheck → EarlyStop | Consolidation → Done
//! ```
//!
//! Only invalid input, a failed generation batch and cancellation surface
//! as errors. Every other failure is recorded as a [`Degradation`] on the
//! result and the run continues.

use crate::config::PipelineConfig;
use crate::ports::completion::CompletionBackend;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger, events,
};
use crate::ports::evidence_source::{EvidenceSource, SourceError};
use crate::ports::progress::{NoProgress, PipelineProgress};
use crate::use_cases::consolidate_answer::ConsolidateAnswerUseCase;
use crate::use_cases::correct_rationale::CorrectRationaleUseCase;
use crate::use_cases::fuse_knowledge::FuseKnowledgeUseCase;
use crate::use_cases::generate_rationales::{GenerateRationalesUseCase, GenerationError};
use crate::use_cases::retrieval_query::RetrievalQueryBuilder;
use crate::use_cases::shared::{is_cancelled, until_cancelled};
use crate::use_cases::validate_consensus::ValidateConsensusUseCase;
use cok_domain::{
    ConsensusResult, DatasetTag, Degradation, DomainError, PipelineResult, PipelineState, Question, Rationale,
    RationaleId, ResultStage, pipeline::after_consensus_check,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that fail a whole run
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RunPipelineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Rationale generation failed: {0}")]
    GenerationFailed(GenerationError),

    #[error("Pipeline cancelled")]
    Cancelled,
}

/// Input for the RunPipeline use case
#[derive(Debug, Clone, Default)]
pub struct RunPipelineInput {
    pub question: String,
    pub dataset: Option<String>,
    pub choices: Vec<String>,
}

impl RunPipelineInput {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Default::default()
        }
    }

    pub fn with_dataset(mut self, dataset: Option<impl Into<String>>) -> Self {
        self.dataset = dataset.map(Into::into);
        self
    }

    pub fn with_choices(mut self, choices: Vec<String>) -> Self {
        self.choices = choices;
        self
    }
}

/// What one rationale's retrieval-and-correction task hands back
struct CorrectionOutcome {
    id: RationaleId,
    rationale: Rationale,
    query: String,
    evidence_sources: Vec<String>,
    evidence_count: usize,
    degradations: Vec<Degradation>,
}

/// Use case for running the full chain-of-knowledge pipeline
pub struct RunPipelineUseCase {
    config: PipelineConfig,
    generator: GenerateRationalesUseCase,
    query_builder: Arc<RetrievalQueryBuilder>,
    fusion: Arc<FuseKnowledgeUseCase>,
    corrector: Arc<CorrectRationaleUseCase>,
    validator: ValidateConsensusUseCase,
    consolidator: ConsolidateAnswerUseCase,
    conversation_logger: Arc<dyn ConversationLogger>,
    cancellation_token: Option<CancellationToken>,
}

impl RunPipelineUseCase {
    /// `sources` are used in the given order, which is also their tie-break
    /// priority during fusion.
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        sources: Vec<Arc<dyn EvidenceSource>>,
        config: PipelineConfig,
    ) -> Self {
        let params = config.completion;
        Self {
            generator: GenerateRationalesUseCase::new(
                Arc::clone(&backend),
                config.sampling.clone(),
                params,
            ),
            query_builder: Arc::new(RetrievalQueryBuilder::new(
                Arc::clone(&backend),
                config.query_mode,
                params,
            )),
            fusion: Arc::new(FuseKnowledgeUseCase::new(sources, config.retrieval)),
            corrector: Arc::new(CorrectRationaleUseCase::new(Arc::clone(&backend), params)),
            validator: ValidateConsensusUseCase::new(Arc::clone(&backend), params),
            consolidator: ConsolidateAnswerUseCase::new(backend, params),
            config,
            conversation_logger: Arc::new(NoConversationLogger),
            cancellation_token: None,
        }
    }

    /// Record a machine-readable transcript of every run
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    /// Set a cancellation token for graceful interruption
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Answer `question`, optionally tagged with its dataset.
    pub async fn run(
        &self,
        question: &str,
        dataset_tag: Option<&str>,
    ) -> Result<PipelineResult, RunPipelineError> {
        self.execute(RunPipelineInput::new(question).with_dataset(dataset_tag))
            .await
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: RunPipelineInput,
    ) -> Result<PipelineResult, RunPipelineError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunPipelineInput,
        progress: &dyn PipelineProgress,
    ) -> Result<PipelineResult, RunPipelineError> {
        // ==================== Init ====================
        let mut state = PipelineState::Init;
        let question = Question::new(input.question)
            .map_err(|e| match e {
                DomainError::InvalidInput(reason) => RunPipelineError::InvalidInput(reason),
                DomainError::Cancelled => RunPipelineError::Cancelled,
            })?
            .with_optional_dataset(input.dataset.as_deref().map(DatasetTag::new))
            .with_choices(input.choices);
        self.ensure_not_cancelled()?;

        let k = self.config.rationale_count(&question);
        info!("Answering '{}' with k={}", question, k);
        let mut degradations = Vec::new();

        // ==================== Reasoning ====================
        self.advance(&mut state, PipelineState::Reasoning, k, progress);
        let generated = until_cancelled(
            &self.cancellation_token,
            self.generator.execute(&question, k),
        )
        .await
        .ok_or(RunPipelineError::Cancelled)?
        .map_err(|e| match e {
            GenerationError::NothingRequested => {
                RunPipelineError::InvalidInput("at least one rationale is required".to_string())
            }
            other => RunPipelineError::GenerationFailed(other),
        })?;
        let raw_rationales = generated.rationales;
        for rationale in &raw_rationales {
            progress.on_rationale_complete(PipelineState::Reasoning, rationale.id(), true);
        }
        self.conversation_logger.log(ConversationEvent::new(
            events::RATIONALES_GENERATED,
            serde_json::json!({
                "question": question.content(),
                "dataset": question.dataset().map(|d| d.as_str()),
                "template": generated.template_id,
                "temperature": generated.decision.temperature,
                "reason": generated.decision.reason,
                "rationales": raw_rationales.iter().map(|r| serde_json::json!({
                    "id": r.id().to_string(),
                    "answer": r.extracted_answer(),
                    "text": r.text(),
                })).collect::<Vec<_>>(),
            }),
        ));
        progress.on_state_complete(PipelineState::Reasoning);

        // ==================== Retrieval & Correction ====================
        self.advance(&mut state, PipelineState::RetrievalAndCorrection, k, progress);
        let rationales = until_cancelled(
            &self.cancellation_token,
            self.retrieve_and_correct(&question, &raw_rationales, &mut degradations, progress),
        )
        .await
        .ok_or(RunPipelineError::Cancelled)?;
        progress.on_state_complete(PipelineState::RetrievalAndCorrection);

        // ==================== Consensus Check ====================
        self.advance(&mut state, PipelineState::ConsensusCheck, 0, progress);
        let consensus = ConsensusResult::evaluate(&rationales, self.config.consensus_threshold);
        info!(
            "Consensus on '{}': {} (threshold {})",
            consensus.candidate_answer,
            consensus.summary(),
            consensus.threshold
        );
        self.conversation_logger.log(ConversationEvent::new(
            events::CONSENSUS_EVALUATED,
            serde_json::json!({
                "candidate_answer": consensus.candidate_answer,
                "agreement_ratio": consensus.agreement_ratio,
                "supporting_count": consensus.supporting_count,
                "total_count": consensus.total_count,
                "threshold": consensus.threshold,
                "reached": consensus.reached,
            }),
        ));

        let validated = if consensus.reached && self.config.early_stopping {
            let verdict = until_cancelled(
                &self.cancellation_token,
                self.validator
                    .execute(question.content(), &consensus.candidate_answer),
            )
            .await
            .ok_or(RunPipelineError::Cancelled)?;

            match verdict {
                Ok(validation) => {
                    self.conversation_logger.log(ConversationEvent::new(
                        events::CONSENSUS_VALIDATED,
                        serde_json::json!({
                            "candidate_answer": consensus.candidate_answer,
                            "approved": validation.approved,
                            "response": validation.response,
                        }),
                    ));
                    if !validation.approved {
                        info!("Validator rejected '{}'", consensus.candidate_answer);
                    }
                    validation.approved
                }
                Err(e) => {
                    self.degrade(
                        &mut degradations,
                        Degradation::ValidationCallFailed {
                            reason: e.to_string(),
                        },
                        progress,
                    );
                    false
                }
            }
        } else {
            if consensus.reached {
                debug!("Early stopping disabled, skipping validation");
            }
            false
        };
        progress.on_state_complete(PipelineState::ConsensusCheck);

        // ==================== Early Stop | Consolidation ====================
        let next = after_consensus_check(consensus.reached, validated);
        self.advance(&mut state, next, 0, progress);

        let (answer, stage) = if next == PipelineState::EarlyStop {
            (
                consensus.candidate_answer.clone(),
                ResultStage::ConsensusValidated,
            )
        } else {
            let consolidated = until_cancelled(
                &self.cancellation_token,
                self.consolidator
                    .execute(&question.render_with_choices(), &rationales),
            )
            .await
            .ok_or(RunPipelineError::Cancelled)?;

            let answer = match consolidated {
                Ok(answer) => {
                    self.conversation_logger.log(ConversationEvent::new(
                        events::ANSWER_CONSOLIDATED,
                        serde_json::json!({ "answer": answer }),
                    ));
                    answer
                }
                Err(e) => {
                    self.degrade(
                        &mut degradations,
                        Degradation::ConsolidationFailed {
                            reason: e.to_string(),
                        },
                        progress,
                    );
                    consensus.candidate_answer.clone()
                }
            };
            (answer, ResultStage::Consolidated)
        };
        progress.on_state_complete(next);

        // ==================== Done ====================
        self.advance(&mut state, PipelineState::Done, 0, progress);
        let result = PipelineResult::new(
            answer,
            rationales,
            raw_rationales,
            stage,
            consensus,
            degradations,
        );

        info!(
            "Answer '{}' ({}, confidence {})",
            result.answer, result.stage, result.confidence
        );
        self.conversation_logger.log(ConversationEvent::new(
            events::PIPELINE_COMPLETED,
            serde_json::json!({
                "answer": result.answer,
                "stage": result.stage,
                "confidence": result.confidence,
                "degradations": result.degradations,
            }),
        ));
        progress.on_state_complete(PipelineState::Done);

        Ok(result)
    }

    /// Ground every raw rationale in evidence, one isolated task each.
    ///
    /// Each task owns its slot; a rationale whose correction fails keeps its
    /// raw version so the consensus input stays 1:1 with the generator output.
    async fn retrieve_and_correct(
        &self,
        question: &Question,
        raw_rationales: &[Rationale],
        degradations: &mut Vec<Degradation>,
        progress: &dyn PipelineProgress,
    ) -> Vec<Rationale> {
        let mut join_set = JoinSet::new();

        for rationale in raw_rationales {
            let question = question.clone();
            let rationale = rationale.clone();
            let query_builder = Arc::clone(&self.query_builder);
            let fusion = Arc::clone(&self.fusion);
            let corrector = Arc::clone(&self.corrector);

            join_set.spawn(async move {
                Self::correct_one(&question, rationale, &query_builder, &fusion, &corrector).await
            });
        }

        let mut slots: Vec<Option<Rationale>> = vec![None; raw_rationales.len()];

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(outcome) => {
                    let corrected = outcome.rationale.is_corrected();
                    self.conversation_logger.log(ConversationEvent::new(
                        events::EVIDENCE_FUSED,
                        serde_json::json!({
                            "rationale_id": outcome.id.to_string(),
                            "query": outcome.query,
                            "snippet_count": outcome.evidence_count,
                            "sources": outcome.evidence_sources,
                        }),
                    ));
                    self.conversation_logger.log(ConversationEvent::new(
                        events::RATIONALE_CORRECTED,
                        serde_json::json!({
                            "rationale_id": outcome.id.to_string(),
                            "corrected": corrected,
                            "answer": outcome.rationale.extracted_answer(),
                            "text": outcome.rationale.text(),
                        }),
                    ));
                    for degradation in outcome.degradations {
                        self.degrade(degradations, degradation, progress);
                    }
                    progress.on_rationale_complete(
                        PipelineState::RetrievalAndCorrection,
                        outcome.id,
                        corrected,
                    );
                    if let Some(slot) = slots.get_mut(outcome.id.index()) {
                        *slot = Some(outcome.rationale);
                    }
                }
                Err(e) => {
                    warn!("Task join error: {}", e);
                }
            }
        }

        slots
            .into_iter()
            .zip(raw_rationales)
            .map(|(slot, raw)| {
                slot.unwrap_or_else(|| {
                    self.degrade(
                        degradations,
                        Degradation::CorrectionFailed {
                            rationale_id: raw.id(),
                            reason: "correction task aborted".to_string(),
                        },
                        progress,
                    );
                    raw.clone()
                })
            })
            .collect()
    }

    async fn correct_one(
        question: &Question,
        rationale: Rationale,
        query_builder: &RetrievalQueryBuilder,
        fusion: &FuseKnowledgeUseCase,
        corrector: &CorrectRationaleUseCase,
    ) -> CorrectionOutcome {
        let id = rationale.id();
        let mut degradations = Vec::new();

        let query = query_builder.build(question, &rationale).await;
        if let Some(reason) = query.fallback_reason {
            degradations.push(Degradation::QueryExtractionFailed {
                rationale_id: id,
                reason,
            });
        }

        let fusion_outcome = fusion.execute(&query.text).await;
        for failure in fusion_outcome.failures {
            degradations.push(match failure.error {
                SourceError::Timeout => Degradation::SourceTimeout {
                    source: failure.source,
                    rationale_id: id,
                },
                SourceError::Unavailable(reason) => Degradation::SourceUnavailable {
                    source: failure.source,
                    rationale_id: id,
                    reason,
                },
            });
        }
        let evidence = fusion_outcome.evidence;

        let rationale = match corrector.execute(question, &rationale, &evidence).await {
            Ok(corrected) => corrected,
            Err(e) => {
                degradations.push(Degradation::CorrectionFailed {
                    rationale_id: id,
                    reason: e.source.to_string(),
                });
                rationale
            }
        };

        CorrectionOutcome {
            id,
            rationale,
            query: query.text,
            evidence_sources: evidence
                .source_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
            evidence_count: evidence.len(),
            degradations,
        }
    }

    fn advance(
        &self,
        state: &mut PipelineState,
        next: PipelineState,
        total_tasks: usize,
        progress: &dyn PipelineProgress,
    ) {
        debug_assert!(
            state.can_transition_to(next),
            "illegal transition {} -> {}",
            state,
            next
        );
        debug!("{} -> {}", state, next);
        *state = next;
        progress.on_state_enter(next, total_tasks);
    }

    fn degrade(
        &self,
        degradations: &mut Vec<Degradation>,
        degradation: Degradation,
        progress: &dyn PipelineProgress,
    ) {
        warn!("Degraded: {}", degradation);
        progress.on_degradation(&degradation);
        degradations.push(degradation);
    }

    fn ensure_not_cancelled(&self) -> Result<(), RunPipelineError> {
        if is_cancelled(&self.cancellation_token) {
            return Err(RunPipelineError::Cancelled);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CompletionParams, RetryPolicy};
    use crate::ports::completion::CompletionError;
    use crate::use_cases::shared::test_support::{FakeSource, ScriptedBackend};
    use cok_domain::Confidence;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const QUESTION: &str = "What is the capital of France?";

    // ==================== Test Helpers ====================

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Stage {
        Reasoning,
        Correction,
        Validation,
        Consolidation,
    }

    fn stage_of(prompt: &str) -> Stage {
        if prompt.starts_with("Given the supporting knowledge") {
            Stage::Correction
        } else if prompt.starts_with("Is '") {
            Stage::Validation
        } else if prompt.starts_with("Based on the following reasoning steps") {
            Stage::Consolidation
        } else {
            Stage::Reasoning
        }
    }

    /// Correction that keeps the rationale's original text.
    fn echo_original(prompt: &str) -> String {
        prompt
            .split("Original Rationale: ")
            .nth(1)
            .and_then(|rest| rest.split("\n\nSupporting Knowledge:").next())
            .unwrap_or_default()
            .to_string()
    }

    /// Backend whose reasoning calls cycle through `answers` and whose
    /// validator replies `validator_reply`.
    fn backend(answers: &'static [&'static str], validator_reply: &'static str) -> Arc<ScriptedBackend> {
        let counter = AtomicUsize::new(0);
        Arc::new(ScriptedBackend::new(move |prompt, _| match stage_of(prompt) {
            Stage::Reasoning => {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                Ok(format!("Reasoning step.\nAnswer: {}", answers[n % answers.len()]))
            }
            Stage::Correction => Ok(echo_original(prompt)),
            Stage::Validation => Ok(validator_reply.to_string()),
            Stage::Consolidation => Ok("Paris".to_string()),
        }))
    }

    fn config(k: usize) -> PipelineConfig {
        PipelineConfig::default()
            .with_num_rationales(k)
            .with_threshold(0.7)
            .with_completion(CompletionParams {
                max_tokens: 128,
                timeout: Duration::from_secs(30),
                retry: RetryPolicy {
                    max_attempts: 2,
                    initial_backoff: Duration::from_millis(1),
                    max_backoff: Duration::from_millis(1),
                },
            })
    }

    fn sources() -> Vec<Arc<dyn EvidenceSource>> {
        vec![Arc::new(FakeSource::returning(
            "wikipedia",
            &[("Paris is the capital and largest city of France.", 0.9)],
        ))]
    }

    fn count_stage(backend: &ScriptedBackend, stage: Stage) -> usize {
        backend
            .prompts()
            .iter()
            .filter(|p| stage_of(p) == stage)
            .count()
    }

    struct RecordingLogger {
        events: Mutex<Vec<&'static str>>,
    }

    impl ConversationLogger for RecordingLogger {
        fn log(&self, event: ConversationEvent) {
            self.events.lock().unwrap().push(event.event_type);
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        states: Mutex<Vec<PipelineState>>,
        degradations: Mutex<usize>,
    }

    impl PipelineProgress for RecordingProgress {
        fn on_state_enter(&self, state: PipelineState, _total_tasks: usize) {
            self.states.lock().unwrap().push(state);
        }
        fn on_rationale_complete(&self, _state: PipelineState, _id: RationaleId, _success: bool) {}
        fn on_state_complete(&self, _state: PipelineState) {}
        fn on_degradation(&self, _degradation: &Degradation) {
            *self.degradations.lock().unwrap() += 1;
        }
    }

    // ==================== End-to-end scenarios ====================

    #[tokio::test]
    async fn test_unanimous_validated_consensus_stops_early() {
        let backend = backend(&["Paris"], "YES");
        let pipeline = RunPipelineUseCase::new(backend.clone(), sources(), config(3));

        let result = pipeline.run(QUESTION, None).await.unwrap();

        assert_eq!(result.stage, ResultStage::ConsensusValidated);
        assert_eq!(result.confidence, Confidence::High);
        assert_eq!(result.answer, "Paris");
        assert_eq!(result.consensus.agreement_ratio, 1.0);
        assert_eq!(result.rationales.len(), 3);
        assert!(result.rationales.iter().all(|r| r.is_corrected()));
        assert_eq!(count_stage(&backend, Stage::Consolidation), 0);

        let validation_prompt = backend
            .prompts()
            .into_iter()
            .find(|p| stage_of(p) == Stage::Validation)
            .unwrap();
        assert!(validation_prompt
            .starts_with("Is 'Paris' reasonable for 'What is the capital of France?'"));
    }

    #[tokio::test]
    async fn test_yes_reply_with_explanation_stops_early() {
        let backend = backend(&["Paris"], "Yes, there is no doubt that Paris is the capital.");
        let pipeline = RunPipelineUseCase::new(backend.clone(), sources(), config(3));

        let result = pipeline.run(QUESTION, None).await.unwrap();

        assert_eq!(result.stage, ResultStage::ConsensusValidated);
        assert_eq!(result.answer, "Paris");
        assert_eq!(count_stage(&backend, Stage::Consolidation), 0);
    }

    #[tokio::test]
    async fn test_split_answers_below_threshold_consolidate() {
        let backend = backend(&["Paris", "Lyon", "Paris"], "YES");
        let pipeline = RunPipelineUseCase::new(backend.clone(), sources(), config(3));

        let result = pipeline.run(QUESTION, None).await.unwrap();

        assert!((result.consensus.agreement_ratio - 2.0 / 3.0).abs() < 1e-9);
        assert!(!result.consensus.reached);
        assert_eq!(result.stage, ResultStage::Consolidated);
        assert_eq!(result.confidence, Confidence::Low);
        assert_eq!(result.answer, "Paris");
        assert_eq!(count_stage(&backend, Stage::Validation), 0);
        assert_eq!(count_stage(&backend, Stage::Consolidation), 1);

        let consolidation_prompt = backend
            .prompts()
            .into_iter()
            .find(|p| stage_of(p) == Stage::Consolidation)
            .unwrap();
        assert_eq!(consolidation_prompt.matches("Answer: Paris").count(), 2);
        assert_eq!(consolidation_prompt.matches("Answer: Lyon").count(), 1);
    }

    #[tokio::test]
    async fn test_rejected_consensus_consolidates() {
        let backend = backend(&["Paris"], "NO");
        let pipeline = RunPipelineUseCase::new(backend.clone(), sources(), config(3));

        let result = pipeline.run(QUESTION, None).await.unwrap();

        assert!(result.consensus.reached);
        assert_eq!(result.stage, ResultStage::Consolidated);
        assert_eq!(count_stage(&backend, Stage::Validation), 1);
        assert_eq!(count_stage(&backend, Stage::Consolidation), 1);
    }

    // ==================== Failure handling ====================

    #[tokio::test]
    async fn test_empty_question_fails_before_any_call() {
        let backend = backend(&["Paris"], "YES");
        let pipeline = RunPipelineUseCase::new(backend.clone(), sources(), config(3));

        let err = pipeline.run("   ", None).await.unwrap_err();

        assert!(matches!(err, RunPipelineError::InvalidInput(_)));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_generation_failure_fails_run() {
        let backend = Arc::new(ScriptedBackend::new(|_, _| {
            Err(CompletionError::ProviderError("unavailable".into()))
        }));
        let pipeline = RunPipelineUseCase::new(backend, sources(), config(2));

        let err = pipeline.run(QUESTION, None).await.unwrap_err();
        assert!(matches!(err, RunPipelineError::GenerationFailed(_)));
    }

    #[tokio::test]
    async fn test_correction_failure_keeps_raw_rationale() {
        let backend = Arc::new(ScriptedBackend::new(|prompt, _| match stage_of(prompt) {
            Stage::Reasoning => Ok("Answer: Paris".to_string()),
            Stage::Correction => Err(CompletionError::RateLimited),
            Stage::Validation => Ok("yes".to_string()),
            Stage::Consolidation => Ok("Paris".to_string()),
        }));
        let pipeline = RunPipelineUseCase::new(backend, sources(), config(3));

        let result = pipeline.run(QUESTION, None).await.unwrap();

        assert_eq!(result.rationales.len(), 3);
        assert_eq!(result.uncorrected_count(), 3);
        assert_eq!(result.consensus.total_count, 3);
        assert_eq!(result.stage, ResultStage::ConsensusValidated);
        let failures = result
            .degradations
            .iter()
            .filter(|d| matches!(d, Degradation::CorrectionFailed { .. }))
            .count();
        assert_eq!(failures, 3);
    }

    #[tokio::test]
    async fn test_validation_call_failure_falls_through_to_consolidation() {
        let backend = Arc::new(ScriptedBackend::new(|prompt, _| match stage_of(prompt) {
            Stage::Reasoning => Ok("Answer: Paris".to_string()),
            Stage::Correction => Ok(echo_original(prompt)),
            Stage::Validation => Err(CompletionError::Timeout),
            Stage::Consolidation => Ok("Paris".to_string()),
        }));
        let pipeline = RunPipelineUseCase::new(backend, sources(), config(3));

        let result = pipeline.run(QUESTION, None).await.unwrap();

        assert_eq!(result.stage, ResultStage::Consolidated);
        assert!(result
            .degradations
            .iter()
            .any(|d| matches!(d, Degradation::ValidationCallFailed { .. })));
    }

    #[tokio::test]
    async fn test_consolidation_failure_uses_consensus_candidate() {
        let counter = AtomicUsize::new(0);
        let backend = Arc::new(ScriptedBackend::new(move |prompt, _| match stage_of(prompt) {
            Stage::Reasoning => {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                Ok(format!("Answer: {}", ["Lyon", "Paris", "Nice"][n % 3]))
            }
            Stage::Correction => Ok(echo_original(prompt)),
            Stage::Validation => Ok("yes".to_string()),
            Stage::Consolidation => Err(CompletionError::ProviderError("down".into())),
        }));
        let pipeline = RunPipelineUseCase::new(backend, sources(), config(3));

        let result = pipeline.run(QUESTION, None).await.unwrap();

        assert_eq!(result.stage, ResultStage::Consolidated);
        assert_eq!(result.answer, result.consensus.candidate_answer);
        assert!(result
            .degradations
            .iter()
            .any(|d| matches!(d, Degradation::ConsolidationFailed { .. })));
    }

    #[tokio::test]
    async fn test_all_sources_failing_still_answers() {
        let backend = backend(&["Paris"], "YES");
        let failing: Vec<Arc<dyn EvidenceSource>> = vec![
            Arc::new(FakeSource::Fails("wikipedia")),
            Arc::new(FakeSource::Fails("duckduckgo")),
        ];
        let pipeline = RunPipelineUseCase::new(backend.clone(), failing, config(2));

        let result = pipeline.run(QUESTION, None).await.unwrap();

        assert_eq!(result.stage, ResultStage::ConsensusValidated);
        assert_eq!(count_stage(&backend, Stage::Correction), 2);
        let unavailable = result
            .degradations
            .iter()
            .filter(|d| matches!(d, Degradation::SourceUnavailable { .. }))
            .count();
        assert_eq!(unavailable, 4);
    }

    // ==================== Configuration ====================

    #[tokio::test]
    async fn test_early_stopping_disabled_always_consolidates() {
        let backend = backend(&["Paris"], "YES");
        let pipeline = RunPipelineUseCase::new(
            backend.clone(),
            sources(),
            config(3).with_early_stopping(false),
        );

        let result = pipeline.run(QUESTION, None).await.unwrap();

        assert_eq!(result.stage, ResultStage::Consolidated);
        assert_eq!(count_stage(&backend, Stage::Validation), 0);
    }

    #[tokio::test]
    async fn test_fact_verification_rationale_override() {
        let backend = backend(&["SUPPORTED"], "YES");
        let pipeline = RunPipelineUseCase::new(
            backend.clone(),
            sources(),
            config(5).with_fact_verification_rationales(Some(2)),
        );

        let result = pipeline
            .run("The Eiffel Tower is in Paris.", Some("fact_verification"))
            .await
            .unwrap();

        assert_eq!(result.raw_rationales.len(), 2);
        assert_eq!(count_stage(&backend, Stage::Reasoning), 2);
    }

    // ==================== Observability ====================

    #[tokio::test]
    async fn test_transcript_and_progress() {
        let backend = backend(&["Paris"], "YES");
        let logger = Arc::new(RecordingLogger {
            events: Mutex::new(Vec::new()),
        });
        let progress = RecordingProgress::default();
        let pipeline = RunPipelineUseCase::new(backend, sources(), config(2))
            .with_conversation_logger(logger.clone());

        pipeline
            .execute_with_progress(RunPipelineInput::new(QUESTION), &progress)
            .await
            .unwrap();

        let logged = logger.events.lock().unwrap().clone();
        assert_eq!(logged.first(), Some(&events::RATIONALES_GENERATED));
        assert_eq!(logged.last(), Some(&events::PIPELINE_COMPLETED));
        assert_eq!(
            logged.iter().filter(|e| **e == events::RATIONALE_CORRECTED).count(),
            2
        );
        assert!(logged.contains(&events::CONSENSUS_VALIDATED));

        assert_eq!(
            *progress.states.lock().unwrap(),
            vec![
                PipelineState::Reasoning,
                PipelineState::RetrievalAndCorrection,
                PipelineState::ConsensusCheck,
                PipelineState::EarlyStop,
                PipelineState::Done,
            ]
        );
        assert_eq!(*progress.degradations.lock().unwrap(), 0);
    }

    // ==================== Cancellation ====================

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let backend = backend(&["Paris"], "YES");
        let token = CancellationToken::new();
        token.cancel();
        let pipeline =
            RunPipelineUseCase::new(backend.clone(), sources(), config(3)).with_cancellation(token);

        let err = pipeline.run(QUESTION, None).await.unwrap_err();

        assert_eq!(err, RunPipelineError::Cancelled);
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_during_generation() {
        let slow = Arc::new(ScriptedBackend::fixed("Answer: Paris").with_delay(Duration::from_secs(20)));
        let token = CancellationToken::new();
        let pipeline =
            RunPipelineUseCase::new(slow, sources(), config(3)).with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            token.cancel();
        });

        let err = pipeline.run(QUESTION, None).await.unwrap_err();
        canceller.await.unwrap();

        assert_eq!(err, RunPipelineError::Cancelled);
    }
}
