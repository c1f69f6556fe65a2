//! Infrastructure layer for chain-of-knowledge
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod llm;
pub mod logging;
pub mod sources;

// Re-export commonly used types
pub use config::{
    ConfigLoader, FileCompletionConfig, FileConfig, FileLoggingConfig, FileOutputConfig,
    FilePipelineConfig, FileRetrievalConfig,
};
pub use llm::{CachingBackend, OpenAiCompatibleBackend};
pub use logging::JsonlConversationLogger;
pub use sources::{
    CorpusSource, DuckDuckGoSource, RegistryError, SourceKind, SourceRegistry, WikidataSource,
    WikipediaSource,
};
