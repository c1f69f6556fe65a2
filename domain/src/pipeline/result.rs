//! Terminal artifact of a pipeline run.

use crate::consensus::ConsensusResult;
use crate::rationale::{Rationale, RationaleId};
use serde::{Deserialize, Serialize};

/// How the final answer was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStage {
    /// Numeric consensus confirmed by the validator
    ConsensusValidated,
    /// Synthesized from all rationales
    Consolidated,
}

impl ResultStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultStage::ConsensusValidated => "consensus_validated",
            ResultStage::Consolidated => "consolidated",
        }
    }

    pub fn confidence(&self) -> Confidence {
        match self {
            ResultStage::ConsensusValidated => Confidence::High,
            ResultStage::Consolidated => Confidence::Low,
        }
    }
}

impl std::fmt::Display for ResultStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Low => "low",
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recoverable failure that did not change the outcome type of the run.
///
/// Degradations are collected on the [`PipelineResult`] so callers can see
/// what the answer was produced without.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degradation {
    /// A source failed for one retrieval call and was dropped
    SourceUnavailable {
        source: String,
        rationale_id: RationaleId,
        reason: String,
    },
    /// A source exceeded its wait bound and was dropped
    SourceTimeout {
        source: String,
        rationale_id: RationaleId,
    },
    /// Model-extracted search query failed; heuristic query used instead
    QueryExtractionFailed {
        rationale_id: RationaleId,
        reason: String,
    },
    /// Correction exhausted retries; the raw rationale was kept
    CorrectionFailed {
        rationale_id: RationaleId,
        reason: String,
    },
    /// Validator call failed; treated as a negative validation
    ValidationCallFailed { reason: String },
    /// Consolidation call failed; the consensus candidate was used
    ConsolidationFailed { reason: String },
}

impl std::fmt::Display for Degradation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Degradation::SourceUnavailable {
                source,
                rationale_id,
                reason,
            } => write!(f, "source '{}' unavailable for {}: {}", source, rationale_id, reason),
            Degradation::SourceTimeout {
                source,
                rationale_id,
            } => write!(f, "source '{}' timed out for {}", source, rationale_id),
            Degradation::QueryExtractionFailed {
                rationale_id,
                reason,
            } => write!(f, "query extraction failed for {}: {}", rationale_id, reason),
            Degradation::CorrectionFailed {
                rationale_id,
                reason,
            } => write!(f, "correction failed for {}, raw answer kept: {}", rationale_id, reason),
            Degradation::ValidationCallFailed { reason } => {
                write!(f, "consensus validation call failed: {}", reason)
            }
            Degradation::ConsolidationFailed { reason } => {
                write!(f, "consolidation failed, consensus candidate used: {}", reason)
            }
        }
    }
}

/// Result of one pipeline run (immutable once returned)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Final answer text, verbatim from the deciding stage
    pub answer: String,
    /// The k rationales fed to the consensus check, in id order
    pub rationales: Vec<Rationale>,
    /// Generator output before correction
    pub raw_rationales: Vec<Rationale>,
    pub stage: ResultStage,
    pub confidence: Confidence,
    pub consensus: ConsensusResult,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degradations: Vec<Degradation>,
}

impl PipelineResult {
    pub fn new(
        answer: impl Into<String>,
        rationales: Vec<Rationale>,
        raw_rationales: Vec<Rationale>,
        stage: ResultStage,
        consensus: ConsensusResult,
        degradations: Vec<Degradation>,
    ) -> Self {
        Self {
            answer: answer.into(),
            rationales,
            raw_rationales,
            stage,
            confidence: stage.confidence(),
            consensus,
            degradations,
        }
    }

    pub fn is_early_stop(&self) -> bool {
        self.stage == ResultStage::ConsensusValidated
    }

    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }

    /// Number of rationales that fell back to their raw version.
    pub fn uncorrected_count(&self) -> usize {
        self.rationales.iter().filter(|r| !r.is_corrected()).count()
    }
}
