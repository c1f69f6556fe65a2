//! Domain layer for chain-of-knowledge
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Rationales and evidence
//!
//! A question is answered by k independently sampled reasoning chains
//! ([`Rationale`]). Each one is grounded in evidence fetched from several
//! knowledge sources and merged into [`FusedEvidence`], then rewritten into a
//! corrected rationale.
//!
//! ## Consensus
//!
//! The corrected rationales' answers are tallied into a [`ConsensusResult`].
//! A run stops early only when agreement reaches the threshold and a
//! validator confirms the candidate; otherwise all rationales are
//! consolidated into one answer.

pub mod answer;
pub mod config;
pub mod consensus;
pub mod core;
pub mod evidence;
pub mod pipeline;
pub mod prompt;
pub mod rationale;
pub mod reasoning;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use consensus::{ConsensusResult, is_affirmative};
pub use core::{
    error::DomainError,
    question::{DatasetTag, Question},
};
pub use evidence::{EvidenceSnippet, FusedEvidence, SourceBatch, score_relevance};
pub use pipeline::{Confidence, Degradation, PipelineResult, PipelineState, ResultStage};
pub use prompt::{PromptTemplate, StagePrompt};
pub use rationale::{Rationale, RationaleId, RationaleOrigin, extract_answer};
pub use reasoning::{ReasoningTemplate, SamplingDecision, SamplingPolicy, SamplingReason};
