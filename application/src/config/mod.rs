//! Application-level configuration.
//!
//! - [`PipelineConfig`]: everything one run needs, passed by value
//! - [`CompletionParams`] / [`RetryPolicy`]: completion call limits
//! - [`RetrievalParams`]: evidence fan-out limits

pub mod pipeline_config;
pub mod retry;

pub use pipeline_config::{CompletionParams, PipelineConfig, QueryMode, RetrievalParams};
pub use retry::RetryPolicy;
