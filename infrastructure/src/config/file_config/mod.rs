//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application types
//! once validated.

mod completion;
mod logging;
mod output;
mod pipeline;
mod retrieval;

pub use completion::FileCompletionConfig;
pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;
pub use pipeline::FilePipelineConfig;
pub use retrieval::FileRetrievalConfig;

use cok_application::PipelineConfig;
use cok_domain::ConfigIssue;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub pipeline: FilePipelineConfig,
    pub completion: FileCompletionConfig,
    pub retrieval: FileRetrievalConfig,
    pub output: FileOutputConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Errors make the configuration unusable; warnings only flag behavior
    /// the user may not expect.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.pipeline.issues();
        issues.extend(self.completion.issues());
        issues.extend(self.retrieval.issues());
        issues
    }

    /// Convert into the orchestrator's immutable configuration.
    pub fn to_pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::default()
            .with_num_rationales(self.pipeline.num_rationales)
            .with_fact_verification_rationales(self.pipeline.fact_verification_rationales)
            .with_threshold(self.pipeline.consensus_threshold)
            .with_early_stopping(self.pipeline.early_stopping)
            .with_query_mode(self.pipeline.parse_query_mode().0)
            .with_completion(self.completion.to_params(self.pipeline.max_tokens))
            .with_retrieval(self.retrieval.to_params())
    }
}
