//! Question value object

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Dataset tags that identify fact-verification questions.
const FACT_VERIFICATION_TAGS: &[&str] = &["fact_verification", "fever"];

/// Dataset identity attached to a question (Value Object)
///
/// Drives the prompt template and temperature policy of the
/// rationale generator. Compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetTag(String);

impl DatasetTag {
    /// The canonical tag for fact-verification datasets.
    pub const FACT_VERIFICATION: &'static str = "fact_verification";

    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into().trim().to_lowercase())
    }

    pub fn fact_verification() -> Self {
        Self(Self::FACT_VERIFICATION.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this tag identifies a fact-verification dataset
    /// (claims labelled SUPPORTED / REFUTED / NOT ENOUGH INFO).
    pub fn is_fact_verification(&self) -> bool {
        FACT_VERIFICATION_TAGS.contains(&self.0.as_str())
    }
}

impl std::fmt::Display for DatasetTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DatasetTag {
    fn from(s: &str) -> Self {
        DatasetTag::new(s)
    }
}

/// A question to be answered by the pipeline (Value Object)
///
/// Immutable text plus an optional dataset tag and an optional
/// multiple-choice option set. The text is guaranteed non-blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dataset: Option<DatasetTag>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    choices: Vec<String>,
}

impl Question {
    /// Create a new question, rejecting blank text.
    pub fn new(content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(DomainError::InvalidInput(
                "question text cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            content,
            dataset: None,
            choices: Vec::new(),
        })
    }

    /// Try to create a new question, returning None if invalid
    pub fn try_new(content: impl Into<String>) -> Option<Self> {
        Self::new(content).ok()
    }

    pub fn with_dataset(mut self, tag: impl Into<DatasetTag>) -> Self {
        self.dataset = Some(tag.into());
        self
    }

    pub fn with_optional_dataset(mut self, tag: Option<DatasetTag>) -> Self {
        self.dataset = tag;
        self
    }

    pub fn with_choices(mut self, choices: Vec<String>) -> Self {
        self.choices = choices;
        self
    }

    /// Get the question content
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn dataset(&self) -> Option<&DatasetTag> {
        self.dataset.as_ref()
    }

    /// Multiple-choice options, empty for open questions.
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    pub fn is_multiple_choice(&self) -> bool {
        !self.choices.is_empty()
    }

    pub fn is_fact_verification(&self) -> bool {
        self.dataset
            .as_ref()
            .is_some_and(DatasetTag::is_fact_verification)
    }

    /// Question text with the options appended as `A. ...` lines.
    pub fn render_with_choices(&self) -> String {
        if self.choices.is_empty() {
            return self.content.clone();
        }
        let mut rendered = self.content.clone();
        rendered.push_str("\n\nOptions:");
        for (i, choice) in self.choices.iter().enumerate() {
            let letter = (b'A' + (i % 26) as u8) as char;
            rendered.push_str(&format!("\n{}. {}", letter, choice));
        }
        rendered
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}
