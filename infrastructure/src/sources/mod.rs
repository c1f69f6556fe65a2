//! Evidence source adapters
//!
//! Web sources return data as-is from their public APIs, truncated to a
//! fixed snippet length. The corpus source serves passages from a local file.

pub mod corpus;
pub mod duckduckgo;
mod http;
pub mod registry;
pub mod wikidata;
pub mod wikipedia;

pub use corpus::CorpusSource;
pub use duckduckgo::DuckDuckGoSource;
pub use registry::{RegistryError, SourceKind, SourceRegistry};
pub use wikidata::WikidataSource;
pub use wikipedia::WikipediaSource;
