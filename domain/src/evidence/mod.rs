//! Evidence domain
//!
//! Evidence snippets come from external knowledge sources; one retrieval
//! fans out to every configured source and the batches are merged into a
//! single [`FusedEvidence`].

pub mod fusion;
pub mod relevance;
pub mod snippet;

pub use fusion::{FusedEvidence, SourceBatch};
pub use relevance::score_relevance;
pub use snippet::EvidenceSnippet;
