//! Local passage corpus for offline runs.
//!
//! The file is read once at startup. Each non-blank line is one passage:
//! either a JSON object with a `text` field (optionally `title`) or plain
//! text. Passages are ranked by relevance to the query.

use async_trait::async_trait;
use cok_application::ports::evidence_source::{EvidenceSource, SourceError};
use cok_domain::EvidenceSnippet;
use cok_domain::score_relevance;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const CORPUS: &str = "corpus";

#[derive(Deserialize)]
struct PassageLine {
    text: String,
    #[serde(default)]
    title: Option<String>,
}

pub struct CorpusSource {
    passages: Vec<String>,
}

impl CorpusSource {
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_text(&content))
    }

    pub fn from_text(content: &str) -> Self {
        let passages = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(parse_line)
            .filter(|passage| !passage.is_empty())
            .collect();
        Self { passages }
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    fn rank(&self, query: &str, limit: usize) -> Vec<EvidenceSnippet> {
        let mut scored: Vec<(f64, &String)> = self
            .passages
            .iter()
            .map(|p| (score_relevance(query, p), p))
            .filter(|(score, _)| *score > 0.0)
            .collect();
        // Stable sort keeps file order among equal scores
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        scored
            .into_iter()
            .take(limit)
            .map(|(score, text)| EvidenceSnippet::new(CORPUS, text.clone(), score))
            .collect()
    }
}

fn parse_line(line: &str) -> String {
    if line.starts_with('{')
        && let Ok(passage) = serde_json::from_str::<PassageLine>(line)
    {
        return match passage.title {
            Some(title) if !title.trim().is_empty() => {
                format!("{}: {}", title.trim(), passage.text.trim())
            }
            _ => passage.text.trim().to_string(),
        };
    }
    line.to_string()
}

#[async_trait]
impl EvidenceSource for CorpusSource {
    fn name(&self) -> &str {
        CORPUS
    }

    async fn fetch(
        &self,
        query: &str,
        limit: usize,
        _timeout: Duration,
    ) -> Result<Vec<EvidenceSnippet>, SourceError> {
        Ok(self.rank(query, limit))
    }
}
