//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw logging configuration from TOML
///
/// ```toml
/// [logging]
/// file = "logs/cok.log"              # diagnostic log, in addition to stderr
/// transcript = "logs/run.jsonl"      # JSONL event transcript
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    pub file: Option<PathBuf>,
    pub transcript: Option<PathBuf>,
}
