//! Application layer for chain-of-knowledge
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{CompletionParams, PipelineConfig, QueryMode, RetrievalParams, RetryPolicy};
pub use ports::{
    completion::{CompletionBackend, CompletionError},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    evidence_source::{EvidenceSource, SourceError},
    progress::{NoProgress, PipelineProgress},
};
pub use use_cases::fuse_knowledge::{FuseKnowledgeUseCase, FusionOutcome, SourceFailure};
pub use use_cases::generate_rationales::{GenerateRationalesUseCase, GenerationError};
pub use use_cases::run_pipeline::{RunPipelineError, RunPipelineInput, RunPipelineUseCase};
