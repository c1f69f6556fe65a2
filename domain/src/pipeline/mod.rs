//! Pipeline domain: run states and the terminal result.

pub mod result;
pub mod state;

pub use result::{Confidence, Degradation, PipelineResult, ResultStage};
pub use state::{PipelineState, after_consensus_check};
