//! Prompt domain
//!
//! Reasoning templates (named, versioned, single slot) and the prompts used
//! by the later pipeline stages.

pub mod stage;
mod template;

pub use stage::StagePrompt;
pub use template::{CHAIN_OF_THOUGHT, FACT_VERIFICATION, INPUT_SLOT, PromptTemplate};
