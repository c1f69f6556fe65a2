//! Wikipedia evidence source.
//!
//! One MediaWiki API call: full-text search as a generator, with the plain
//! text intro of each hit. Intros are cut to 300 characters.

use super::http;
use async_trait::async_trait;
use cok_application::ports::evidence_source::{EvidenceSource, SourceError};
use cok_domain::EvidenceSnippet;
use cok_domain::core::string::truncate_chars;
use cok_domain::score_relevance;
use std::time::Duration;

pub const WIKIPEDIA: &str = "wikipedia";

const API_URL: &str = "https://en.wikipedia.org/w/api.php";

/// Longest search string the API accepts.
const MAX_QUERY_CHARS: usize = 300;

const MAX_SUMMARY_CHARS: usize = 300;

pub struct WikipediaSource {
    client: reqwest::Client,
    api_url: String,
}

impl WikipediaSource {
    pub fn new() -> Result<Self, SourceError> {
        Self::with_api_url(API_URL)
    }

    pub fn with_api_url(api_url: impl Into<String>) -> Result<Self, SourceError> {
        Ok(Self {
            client: http::client()?,
            api_url: api_url.into(),
        })
    }
}

/// Page intros in search-rank order.
fn parse_extracts(body: &serde_json::Value) -> Vec<String> {
    let Some(pages) = body["query"]["pages"].as_array() else {
        return Vec::new();
    };

    let mut ranked: Vec<(u64, &str)> = pages
        .iter()
        .filter_map(|page| {
            let extract = page["extract"].as_str()?.trim();
            if extract.is_empty() {
                return None;
            }
            Some((page["index"].as_u64().unwrap_or(u64::MAX), extract))
        })
        .collect();
    ranked.sort_by_key(|(index, _)| *index);

    ranked
        .into_iter()
        .map(|(_, extract)| truncate_chars(extract, MAX_SUMMARY_CHARS).to_string())
        .collect()
}

#[async_trait]
impl EvidenceSource for WikipediaSource {
    fn name(&self) -> &str {
        WIKIPEDIA
    }

    async fn fetch(
        &self,
        query: &str,
        limit: usize,
        timeout: Duration,
    ) -> Result<Vec<EvidenceSnippet>, SourceError> {
        let search = truncate_chars(query, MAX_QUERY_CHARS);
        let limit_param = limit.max(1).to_string();

        let body = http::get_json(
            &self.client,
            &self.api_url,
            &[
                ("action", "query"),
                ("format", "json"),
                ("formatversion", "2"),
                ("generator", "search"),
                ("gsrsearch", search),
                ("gsrlimit", limit_param.as_str()),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("exlimit", "max"),
            ],
            timeout,
        )
        .await?;

        Ok(parse_extracts(&body)
            .into_iter()
            .take(limit)
            .map(|text| {
                let score = score_relevance(query, &text);
                EvidenceSnippet::new(WIKIPEDIA, text, score)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extracts_orders_by_index() {
        let body = serde_json::json!({
            "query": { "pages": [
                { "title": "Lyon", "index": 2, "extract": "Lyon is a city in France." },
                { "title": "Paris", "index": 1, "extract": "Paris is the capital of France." },
                { "title": "Empty", "index": 3, "extract": "" }
            ]}
        });

        assert_eq!(
            parse_extracts(&body),
            vec!["Paris is the capital of France.", "Lyon is a city in France."]
        );
    }

    #[test]
    fn test_parse_extracts_truncates() {
        let long = "a".repeat(1000);
        let body = serde_json::json!({ "query": { "pages": [{ "index": 1, "extract": long }] } });
        assert_eq!(parse_extracts(&body)[0].len(), MAX_SUMMARY_CHARS);
    }

    #[test]
    fn test_parse_extracts_no_results() {
        assert!(parse_extracts(&serde_json::json!({ "batchcomplete": true })).is_empty());
    }
}
