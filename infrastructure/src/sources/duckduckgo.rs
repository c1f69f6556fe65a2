//! DuckDuckGo Instant Answer evidence source.
//!
//! Uses the [DuckDuckGo Instant Answer API](https://api.duckduckgo.com/),
//! which needs no API key and returns abstracts, instant answers,
//! definitions and related topics rather than full result listings.
//! Each field becomes one snippet, cut to 200 characters.

use super::http;
use async_trait::async_trait;
use cok_application::ports::evidence_source::{EvidenceSource, SourceError};
use cok_domain::EvidenceSnippet;
use cok_domain::core::string::truncate_chars;
use cok_domain::score_relevance;
use std::time::Duration;

pub const DUCKDUCKGO: &str = "duckduckgo";

/// DuckDuckGo Instant Answer API endpoint (no API key required).
const DDG_API_URL: &str = "https://api.duckduckgo.com/";

const MAX_SNIPPET_CHARS: usize = 200;

pub struct DuckDuckGoSource {
    client: reqwest::Client,
}

impl DuckDuckGoSource {
    pub fn new() -> Result<Self, SourceError> {
        Ok(Self {
            client: http::client()?,
        })
    }
}

/// Extract snippet texts from an Instant Answer response.
///
/// Order: abstract, instant answer, definition, then related topics.
/// Nested topic groups are skipped.
fn extract_snippets(data: &serde_json::Value) -> Vec<String> {
    let mut texts: Vec<&str> = Vec::new();

    for field in ["AbstractText", "Answer", "Definition"] {
        if let Some(text) = data[field].as_str()
            && !text.trim().is_empty()
        {
            texts.push(text.trim());
        }
    }

    if let Some(topics) = data["RelatedTopics"].as_array() {
        texts.extend(
            topics
                .iter()
                .filter_map(|t| t["Text"].as_str())
                .map(str::trim)
                .filter(|t| !t.is_empty()),
        );
    }

    texts
        .into_iter()
        .map(|t| truncate_chars(t, MAX_SNIPPET_CHARS).to_string())
        .collect()
}

#[async_trait]
impl EvidenceSource for DuckDuckGoSource {
    fn name(&self) -> &str {
        DUCKDUCKGO
    }

    async fn fetch(
        &self,
        query: &str,
        limit: usize,
        timeout: Duration,
    ) -> Result<Vec<EvidenceSnippet>, SourceError> {
        let body = http::get_json(
            &self.client,
            DDG_API_URL,
            &[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ],
            timeout,
        )
        .await?;

        Ok(extract_snippets(&body)
            .into_iter()
            .take(limit)
            .map(|text| {
                let score = score_relevance(query, &text);
                EvidenceSnippet::new(DUCKDUCKGO, text, score)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_all_sections() {
        let data = serde_json::json!({
            "AbstractText": "Paris is the capital and most populous city of France.",
            "Answer": "",
            "Definition": "Paris: capital of France",
            "RelatedTopics": [
                { "Text": "Paris Commune - revolutionary government", "FirstURL": "https://duckduckgo.com/x" },
                { "Name": "Group", "Topics": [ { "Text": "nested" } ] }
            ]
        });

        assert_eq!(
            extract_snippets(&data),
            vec![
                "Paris is the capital and most populous city of France.",
                "Paris: capital of France",
                "Paris Commune - revolutionary government",
            ]
        );
    }

    #[test]
    fn test_extract_truncates_to_200_chars() {
        let data = serde_json::json!({ "AbstractText": "é".repeat(500) });
        assert_eq!(extract_snippets(&data)[0].chars().count(), MAX_SNIPPET_CHARS);
    }

    #[test]
    fn test_extract_empty_response() {
        assert!(extract_snippets(&serde_json::json!({})).is_empty());
    }
}
