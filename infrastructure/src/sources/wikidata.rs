//! Wikidata entity search evidence source.
//!
//! Uses `wbsearchentities` and turns every matched entity into a
//! `"label: description"` snippet. Structured (SPARQL) queries are not built.

use super::http;
use async_trait::async_trait;
use cok_application::ports::evidence_source::{EvidenceSource, SourceError};
use cok_domain::EvidenceSnippet;
use cok_domain::core::string::truncate_chars;
use cok_domain::score_relevance;
use std::time::Duration;

pub const WIKIDATA: &str = "wikidata";

const API_URL: &str = "https://www.wikidata.org/w/api.php";

/// Entity search matches labels, so long queries never hit.
const MAX_QUERY_CHARS: usize = 250;

pub struct WikidataSource {
    client: reqwest::Client,
}

impl WikidataSource {
    pub fn new() -> Result<Self, SourceError> {
        Ok(Self {
            client: http::client()?,
        })
    }
}

fn parse_entities(body: &serde_json::Value) -> Vec<String> {
    let Some(results) = body["search"].as_array() else {
        return Vec::new();
    };

    results
        .iter()
        .filter_map(|entity| {
            let label = entity["label"].as_str()?.trim();
            match entity["description"].as_str().map(str::trim) {
                Some(description) if !description.is_empty() => {
                    Some(format!("{}: {}", label, description))
                }
                _ => None,
            }
        })
        .collect()
}

#[async_trait]
impl EvidenceSource for WikidataSource {
    fn name(&self) -> &str {
        WIKIDATA
    }

    async fn fetch(
        &self,
        query: &str,
        limit: usize,
        timeout: Duration,
    ) -> Result<Vec<EvidenceSnippet>, SourceError> {
        let limit_param = limit.clamp(1, 50).to_string();
        let body = http::get_json(
            &self.client,
            API_URL,
            &[
                ("action", "wbsearchentities"),
                ("format", "json"),
                ("language", "en"),
                ("type", "item"),
                ("search", truncate_chars(query, MAX_QUERY_CHARS)),
                ("limit", limit_param.as_str()),
            ],
            timeout,
        )
        .await?;

        if let Some(error) = body["error"]["info"].as_str() {
            return Err(SourceError::Unavailable(error.to_string()));
        }

        Ok(parse_entities(&body)
            .into_iter()
            .take(limit)
            .map(|text| {
                let score = score_relevance(query, &text);
                EvidenceSnippet::new(WIKIDATA, text, score)
            })
            .collect())
    }
}
