//! Consensus domain
//!
//! Majority agreement across corrected rationales, and parsing of the
//! validator's judgement of a candidate answer. Early stop requires both a
//! reached [`ConsensusResult`] and an affirmative validator reply.

pub mod evaluation;
pub mod parsing;

pub use evaluation::ConsensusResult;
pub use parsing::is_affirmative;
