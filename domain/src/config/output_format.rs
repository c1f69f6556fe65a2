//! Output format value object

use serde::{Deserialize, Serialize};

/// How a pipeline result is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Rationales, consensus and answer
    Full,
    /// Only the final answer (default)
    #[default]
    Answer,
    /// The whole result as JSON
    Json,
}
