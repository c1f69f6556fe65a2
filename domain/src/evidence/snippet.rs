//! Evidence snippet value object

use crate::core::string::normalize_whitespace_lower;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One piece of evidence returned by a knowledge source (Value Object)
///
/// Ephemeral: scoped to the retrieval call that produced it and never
/// persisted beyond the processing of one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceSnippet {
    source_name: String,
    text: String,
    relevance_score: f64,
    fetched_at: DateTime<Utc>,
}

impl EvidenceSnippet {
    /// Create a snippet stamped with the current time.
    ///
    /// `relevance_score` is clamped to `[0, 1]`; NaN becomes 0.
    pub fn new(source_name: impl Into<String>, text: impl Into<String>, relevance_score: f64) -> Self {
        Self {
            source_name: source_name.into(),
            text: text.into(),
            relevance_score: clamp_unit(relevance_score),
            fetched_at: Utc::now(),
        }
    }

    pub fn with_fetched_at(mut self, fetched_at: DateTime<Utc>) -> Self {
        self.fetched_at = fetched_at;
        self
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn relevance_score(&self) -> f64 {
        self.relevance_score
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Case-insensitive, whitespace-normalized text used for deduplication.
    pub fn normalized_text(&self) -> String {
        normalize_whitespace_lower(&self.text)
    }
}

fn clamp_unit(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}
