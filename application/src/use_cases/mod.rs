//! Use cases
//!
//! Application-level operations that orchestrate domain logic. Each stage
//! of the pipeline is its own use case; [`run_pipeline`] sequences them.

pub mod consolidate_answer;
pub mod correct_rationale;
pub mod fuse_knowledge;
pub mod generate_rationales;
pub mod retrieval_query;
pub mod run_pipeline;
pub(crate) mod shared;
pub mod validate_consensus;
