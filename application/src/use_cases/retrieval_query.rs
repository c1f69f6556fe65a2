//! Retrieval query derivation for one rationale.

use crate::config::{CompletionParams, QueryMode};
use crate::ports::completion::CompletionBackend;
use crate::use_cases::shared::{DETERMINISTIC_TEMPERATURE, complete_with_retry};
use cok_domain::core::string::truncate_chars;
use cok_domain::{Question, Rationale, StagePrompt};
use std::sync::Arc;
use tracing::debug;

/// Longest query sent to a source, in characters.
pub const MAX_QUERY_CHARS: usize = 300;

/// Query built for a rationale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalQuery {
    pub text: String,
    /// Set when model extraction failed and the heuristic was used instead
    pub fallback_reason: Option<String>,
}

pub struct RetrievalQueryBuilder {
    backend: Arc<dyn CompletionBackend>,
    mode: QueryMode,
    params: CompletionParams,
}

impl RetrievalQueryBuilder {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        mode: QueryMode,
        params: CompletionParams,
    ) -> Self {
        Self {
            backend,
            mode,
            params,
        }
    }

    /// Question text followed by the rationale's answer.
    pub fn heuristic(question: &Question, rationale: &Rationale) -> String {
        let combined = format!(
            "{} {}",
            question.content().trim(),
            rationale.extracted_answer().trim()
        );
        truncate_chars(combined.trim(), MAX_QUERY_CHARS).to_string()
    }

    pub async fn build(&self, question: &Question, rationale: &Rationale) -> RetrievalQuery {
        match self.mode {
            QueryMode::Heuristic => RetrievalQuery {
                text: Self::heuristic(question, rationale),
                fallback_reason: None,
            },
            QueryMode::LlmExtracted => {
                let prompt = StagePrompt::query_extraction(rationale.text());
                let extracted = complete_with_retry(
                    self.backend.as_ref(),
                    &prompt,
                    DETERMINISTIC_TEMPERATURE,
                    &self.params,
                )
                .await;

                let reason = match extracted {
                    Ok(text) => match clean_query(&text) {
                        Some(query) => {
                            debug!("{} query: {}", rationale.id(), query);
                            return RetrievalQuery {
                                text: truncate_chars(&query, MAX_QUERY_CHARS).to_string(),
                                fallback_reason: None,
                            };
                        }
                        None => "empty query".to_string(),
                    },
                    Err(e) => e.to_string(),
                };

                RetrievalQuery {
                    text: Self::heuristic(question, rationale),
                    fallback_reason: Some(reason),
                }
            }
        }
    }
}

/// First non-empty line, without a `Search query:` lead-in or quotes.
fn clean_query(response: &str) -> Option<String> {
    let line = response.lines().map(str::trim).find(|l| !l.is_empty())?;
    let line = line
        .strip_prefix("Search query:")
        .or_else(|| line.strip_prefix("Query:"))
        .unwrap_or(line)
        .trim()
        .trim_matches(|c| c == '"' || c == '\'');
    (!line.is_empty()).then(|| line.to_string())
}
