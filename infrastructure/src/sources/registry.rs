//! Source registry: maps configured names to source adapters.
//!
//! The configured list is ordered, and that order is the fusion priority.

use super::{CorpusSource, DuckDuckGoSource, WikidataSource, WikipediaSource};
use cok_application::ports::evidence_source::{EvidenceSource, SourceError};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Every source this build knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Wikipedia,
    DuckDuckGo,
    Wikidata,
    Corpus,
}

impl SourceKind {
    pub const ALL: [SourceKind; 4] = [
        SourceKind::Wikipedia,
        SourceKind::DuckDuckGo,
        SourceKind::Wikidata,
        SourceKind::Corpus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Wikipedia => super::wikipedia::WIKIPEDIA,
            SourceKind::DuckDuckGo => super::duckduckgo::DUCKDUCKGO,
            SourceKind::Wikidata => super::wikidata::WIKIDATA,
            SourceKind::Corpus => super::corpus::CORPUS,
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(SourceKind::as_str).collect()
    }
}

impl FromStr for SourceKind {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lower)
            .ok_or_else(|| RegistryError::UnknownSource(s.to_string()))
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Unknown evidence source: {0}")]
    UnknownSource(String),

    #[error("The corpus source needs retrieval.corpus_path")]
    MissingCorpusPath,

    #[error("Failed to load corpus {path}: {source}")]
    CorpusLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to initialize {name}: {source}")]
    Init {
        name: &'static str,
        #[source]
        source: SourceError,
    },
}

/// Builds the ordered source list from configured names.
pub struct SourceRegistry;

impl SourceRegistry {
    pub fn build(
        names: &[String],
        corpus_path: Option<&Path>,
    ) -> Result<Vec<Arc<dyn EvidenceSource>>, RegistryError> {
        let mut kinds: Vec<SourceKind> = Vec::with_capacity(names.len());
        for name in names {
            let kind: SourceKind = name.parse()?;
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }

        kinds
            .into_iter()
            .map(|kind| Self::create(kind, corpus_path))
            .collect()
    }

    fn create(
        kind: SourceKind,
        corpus_path: Option<&Path>,
    ) -> Result<Arc<dyn EvidenceSource>, RegistryError> {
        let init = |source| RegistryError::Init {
            name: kind.as_str(),
            source,
        };

        let source: Arc<dyn EvidenceSource> = match kind {
            SourceKind::Wikipedia => Arc::new(WikipediaSource::new().map_err(init)?),
            SourceKind::DuckDuckGo => Arc::new(DuckDuckGoSource::new().map_err(init)?),
            SourceKind::Wikidata => Arc::new(WikidataSource::new().map_err(init)?),
            SourceKind::Corpus => {
                let path = corpus_path.ok_or(RegistryError::MissingCorpusPath)?;
                let corpus =
                    CorpusSource::load(path).map_err(|source| RegistryError::CorpusLoad {
                        path: path.to_path_buf(),
                        source,
                    })?;
                info!("Loaded {} passages from {}", corpus.len(), path.display());
                Arc::new(corpus)
            }
        };
        Ok(source)
    }
}
