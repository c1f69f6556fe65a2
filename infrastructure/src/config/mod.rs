//! Configuration file loading for chain-of-knowledge
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `COK_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./cok.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/chain-of-knowledge/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileCompletionConfig, FileConfig, FileLoggingConfig, FileOutputConfig, FilePipelineConfig,
    FileRetrievalConfig,
};
pub use loader::{ConfigLoader, ENV_PREFIX, PROJECT_CONFIG_FILE};
