//! Pipeline configuration: one immutable value threaded into the orchestrator.

use super::retry::RetryPolicy;
use cok_domain::{Question, SamplingPolicy};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the retrieval query for a rationale is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    /// Question text plus the rationale's extracted answer
    #[default]
    Heuristic,
    /// Ask the model for a search query, falling back to the heuristic
    LlmExtracted,
}

impl std::str::FromStr for QueryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "heuristic" => Ok(QueryMode::Heuristic),
            "llm_extracted" | "llm" => Ok(QueryMode::LlmExtracted),
            other => Err(format!("unknown query mode: {}", other)),
        }
    }
}

/// Parameters shared by every completion call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionParams {
    pub max_tokens: u32,
    /// Per-attempt timeout
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
        }
    }
}

/// Parameters of the knowledge fusion fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalParams {
    /// `limit` passed to every source
    pub per_source_limit: usize,
    /// Snippets kept after fusion
    pub max_snippets: usize,
    /// Timeout handed to each `fetch`
    pub fetch_timeout: Duration,
    /// Upper bound on one source's total time, retries included
    pub max_wait: Duration,
    /// Extra attempts per source after the first failure
    pub source_retries: u32,
}

impl Default for RetrievalParams {
    fn default() -> Self {
        Self {
            per_source_limit: 3,
            max_snippets: 5,
            fetch_timeout: Duration::from_secs(10),
            max_wait: Duration::from_secs(15),
            source_retries: 1,
        }
    }
}

/// Complete, immutable pipeline configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// k, the number of rationales per question
    pub num_rationales: usize,
    /// Overrides k for fact-verification questions
    pub fact_verification_rationales: Option<usize>,
    pub consensus_threshold: f64,
    /// When false every run consolidates
    pub early_stopping: bool,
    pub query_mode: QueryMode,
    pub sampling: SamplingPolicy,
    pub completion: CompletionParams,
    pub retrieval: RetrievalParams,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            num_rationales: 5,
            fact_verification_rationales: None,
            consensus_threshold: 0.7,
            early_stopping: true,
            query_mode: QueryMode::default(),
            sampling: SamplingPolicy::default(),
            completion: CompletionParams::default(),
            retrieval: RetrievalParams::default(),
        }
    }
}

impl PipelineConfig {
    // ==================== Builder Methods ====================

    pub fn with_num_rationales(mut self, k: usize) -> Self {
        self.num_rationales = k;
        self
    }

    pub fn with_fact_verification_rationales(mut self, k: Option<usize>) -> Self {
        self.fact_verification_rationales = k;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.consensus_threshold = threshold;
        self
    }

    pub fn with_early_stopping(mut self, enabled: bool) -> Self {
        self.early_stopping = enabled;
        self
    }

    pub fn with_query_mode(mut self, mode: QueryMode) -> Self {
        self.query_mode = mode;
        self
    }

    pub fn with_completion(mut self, completion: CompletionParams) -> Self {
        self.completion = completion;
        self
    }

    pub fn with_retrieval(mut self, retrieval: RetrievalParams) -> Self {
        self.retrieval = retrieval;
        self
    }

    /// Number of rationales to generate for `question`.
    pub fn rationale_count(&self, question: &Question) -> usize {
        match self.fact_verification_rationales {
            Some(k) if question.is_fact_verification() => k,
            _ => self.num_rationales,
        }
    }
}
