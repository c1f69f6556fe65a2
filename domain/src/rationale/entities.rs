//! Rationale entity

use super::parsing::{answer_key, extract_answer};
use serde::{Deserialize, Serialize};

/// Identifier of a rationale within one pipeline run.
///
/// Assigned by the generator in request order (0-based). A corrected
/// rationale keeps the id of the raw rationale it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RationaleId(pub usize);

impl RationaleId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for RationaleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rationale-{}", self.0 + 1)
    }
}

/// Where a rationale came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RationaleOrigin {
    /// Produced by the rationale generator
    Raw,
    /// Rewritten by the rationale corrector against fused evidence
    Corrected,
}

impl RationaleOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            RationaleOrigin::Raw => "raw",
            RationaleOrigin::Corrected => "corrected",
        }
    }
}

impl std::fmt::Display for RationaleOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single reasoning chain and the answer parsed from it (Value Object)
///
/// `extracted_answer` is always derived from `text` by
/// [`extract_answer`], so the two cannot drift apart. Correction produces a
/// new value rather than mutating the raw one, which stays available for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rationale {
    id: RationaleId,
    text: String,
    extracted_answer: String,
    origin: RationaleOrigin,
}

impl Rationale {
    /// Create a raw rationale as returned by the generator.
    pub fn raw(id: RationaleId, text: impl Into<String>) -> Self {
        Self::with_origin(id, text, RationaleOrigin::Raw)
    }

    /// Create the corrected successor of this rationale.
    pub fn corrected(&self, text: impl Into<String>) -> Self {
        Self::with_origin(self.id, text, RationaleOrigin::Corrected)
    }

    fn with_origin(id: RationaleId, text: impl Into<String>, origin: RationaleOrigin) -> Self {
        let text = text.into();
        let extracted_answer = extract_answer(&text);
        Self {
            id,
            text,
            extracted_answer,
            origin,
        }
    }

    pub fn id(&self) -> RationaleId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn extracted_answer(&self) -> &str {
        &self.extracted_answer
    }

    pub fn origin(&self) -> RationaleOrigin {
        self.origin
    }

    pub fn is_corrected(&self) -> bool {
        self.origin == RationaleOrigin::Corrected
    }

    /// Normalized key of the extracted answer, used for majority counting.
    pub fn answer_key(&self) -> String {
        answer_key(&self.extracted_answer)
    }
}
