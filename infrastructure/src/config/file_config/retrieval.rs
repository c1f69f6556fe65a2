//! Evidence retrieval configuration from TOML (`[retrieval]` section)

use crate::sources::SourceKind;
use cok_application::RetrievalParams;
use cok_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Raw retrieval configuration from TOML
///
/// `sources` is ordered: earlier sources win ties during fusion.
///
/// # Example
///
/// ```toml
/// [retrieval]
/// sources = ["wikipedia", "duckduckgo", "wikidata"]
/// per_source_limit = 3
/// max_snippets = 5
/// fetch_timeout_seconds = 10
/// max_wait_seconds = 15
/// source_retries = 1
/// corpus_path = "data/passages.jsonl"   # required by the "corpus" source
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetrievalConfig {
    pub sources: Vec<String>,
    pub per_source_limit: usize,
    pub max_snippets: usize,
    pub fetch_timeout_seconds: u64,
    pub max_wait_seconds: u64,
    pub source_retries: u32,
    pub corpus_path: Option<PathBuf>,
}

impl Default for FileRetrievalConfig {
    fn default() -> Self {
        Self {
            sources: vec![
                "wikipedia".to_string(),
                "duckduckgo".to_string(),
                "wikidata".to_string(),
            ],
            per_source_limit: 3,
            max_snippets: 5,
            fetch_timeout_seconds: 10,
            max_wait_seconds: 15,
            source_retries: 1,
            corpus_path: None,
        }
    }
}

impl FileRetrievalConfig {
    pub fn to_params(&self) -> RetrievalParams {
        RetrievalParams {
            per_source_limit: self.per_source_limit,
            max_snippets: self.max_snippets,
            fetch_timeout: Duration::from_secs(self.fetch_timeout_seconds),
            max_wait: Duration::from_secs(self.max_wait_seconds),
            source_retries: self.source_retries,
        }
    }

    pub fn issues(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.sources.is_empty() {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::NoSources,
                "retrieval.sources is empty: corrections will run without evidence",
            ));
        }

        for name in &self.sources {
            match name.parse::<SourceKind>() {
                Ok(SourceKind::Corpus) if self.corpus_path.is_none() => {
                    issues.push(ConfigIssue::error(
                        ConfigIssueCode::MissingCorpusPath,
                        "retrieval.sources includes 'corpus' but retrieval.corpus_path is not set",
                    ));
                }
                Ok(_) => {}
                Err(_) => issues.push(ConfigIssue::error(
                    ConfigIssueCode::UnknownSource,
                    format!(
                        "retrieval.sources: unknown source '{}' (known: {})",
                        name,
                        SourceKind::names().join(", ")
                    ),
                )),
            }
        }

        for (field, value) in [
            ("per_source_limit", self.per_source_limit),
            ("max_snippets", self.max_snippets),
        ] {
            if value == 0 {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::ZeroSnippetLimit,
                    format!("retrieval.{} must be at least 1", field),
                ));
            }
        }

        if self.fetch_timeout_seconds == 0 || self.max_wait_seconds == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroTimeout,
                "retrieval.fetch_timeout_seconds and retrieval.max_wait_seconds must be positive",
            ));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_source_is_error() {
        let config = FileRetrievalConfig {
            sources: vec!["wikipedia".to_string(), "altavista".to_string()],
            ..Default::default()
        };
        let issues = config.issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::UnknownSource);
        assert!(issues[0].message.contains("altavista"));
    }

    #[test]
    fn test_corpus_without_path() {
        let config = FileRetrievalConfig {
            sources: vec!["corpus".to_string()],
            ..Default::default()
        };
        assert_eq!(config.issues()[0].code, ConfigIssueCode::MissingCorpusPath);

        let with_path = FileRetrievalConfig {
            sources: vec!["corpus".to_string()],
            corpus_path: Some(PathBuf::from("passages.txt")),
            ..Default::default()
        };
        assert!(with_path.issues().is_empty());
    }

    #[test]
    fn test_no_sources_warns() {
        let config = FileRetrievalConfig {
            sources: vec![],
            ..Default::default()
        };
        let issues = config.issues();
        assert_eq!(issues.len(), 1);
        assert!(!issues[0].is_error());
    }

    #[test]
    fn test_zero_snippet_limits_are_errors() {
        let config = FileRetrievalConfig {
            per_source_limit: 0,
            max_snippets: 0,
            ..Default::default()
        };
        let issues = config.issues();
        assert_eq!(issues.len(), 2);
        assert!(
            issues
                .iter()
                .all(|i| i.code == ConfigIssueCode::ZeroSnippetLimit && i.is_error())
        );
        assert!(issues[0].message.contains("per_source_limit"));
        assert!(issues[1].message.contains("max_snippets"));
    }

    #[test]
    fn test_defaults_are_clean() {
        assert!(FileRetrievalConfig::default().issues().is_empty());
    }

    #[test]
    fn test_to_params() {
        let params = FileRetrievalConfig::default().to_params();
        assert_eq!(params.per_source_limit, 3);
        assert_eq!(params.max_snippets, 5);
        assert_eq!(params.fetch_timeout, Duration::from_secs(10));
        assert_eq!(params.max_wait, Duration::from_secs(15));
        assert_eq!(params.source_retries, 1);
    }
}
