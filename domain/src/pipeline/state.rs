//! Per-question pipeline state machine.

use serde::{Deserialize, Serialize};

/// State of one pipeline run
///
/// ```text
/// Init → Reasoning → RetrievalAndCorrection → ConsensusCheck → EarlyStop     → Done
///                                                            ↘ Consolidation ↗
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Init,
    Reasoning,
    RetrievalAndCorrection,
    ConsensusCheck,
    EarlyStop,
    Consolidation,
    Done,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Init => "init",
            PipelineState::Reasoning => "reasoning",
            PipelineState::RetrievalAndCorrection => "retrieval_and_correction",
            PipelineState::ConsensusCheck => "consensus_check",
            PipelineState::EarlyStop => "early_stop",
            PipelineState::Consolidation => "consolidation",
            PipelineState::Done => "done",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PipelineState::Init => "Init",
            PipelineState::Reasoning => "Reasoning",
            PipelineState::RetrievalAndCorrection => "Retrieval & Correction",
            PipelineState::ConsensusCheck => "Consensus Check",
            PipelineState::EarlyStop => "Early Stop",
            PipelineState::Consolidation => "Consolidation",
            PipelineState::Done => "Done",
        }
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Init, Reasoning)
                | (Reasoning, RetrievalAndCorrection)
                | (RetrievalAndCorrection, ConsensusCheck)
                | (ConsensusCheck, EarlyStop)
                | (ConsensusCheck, Consolidation)
                | (EarlyStop, Done)
                | (Consolidation, Done)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done)
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Outcome of the consensus check, deciding the next state.
///
/// Early stop needs both numeric agreement and a positive validation; every
/// other combination falls through to consolidation.
pub fn after_consensus_check(consensus_reached: bool, validated: bool) -> PipelineState {
    if consensus_reached && validated {
        PipelineState::EarlyStop
    } else {
        PipelineState::Consolidation
    }
}
