//! Pipeline configuration from TOML (`[pipeline]` section)

use cok_application::QueryMode;
use cok_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

/// Raw pipeline configuration from TOML
///
/// # Example
///
/// ```toml
/// [pipeline]
/// num_rationales = 5
/// fact_verification_rationales = 3   # optional override for fact checks
/// consensus_threshold = 0.7
/// early_stopping = true
/// max_tokens = 1024
/// query_mode = "heuristic"           # "heuristic" or "llm_extracted"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePipelineConfig {
    pub num_rationales: usize,
    pub fact_verification_rationales: Option<usize>,
    pub consensus_threshold: f64,
    pub early_stopping: bool,
    pub max_tokens: u32,
    pub query_mode: String,
}

impl Default for FilePipelineConfig {
    fn default() -> Self {
        Self {
            num_rationales: 5,
            fact_verification_rationales: None,
            consensus_threshold: 0.7,
            early_stopping: true,
            max_tokens: 1024,
            query_mode: "heuristic".to_string(),
        }
    }
}

impl FilePipelineConfig {
    /// Parse `query_mode`, falling back to the heuristic with a warning.
    pub fn parse_query_mode(&self) -> (QueryMode, Vec<ConfigIssue>) {
        match self.query_mode.parse::<QueryMode>() {
            Ok(mode) => (mode, vec![]),
            Err(_) => (
                QueryMode::default(),
                vec![ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue,
                    format!(
                        "pipeline.query_mode: unknown value '{}', falling back to 'heuristic' \
                         (valid: heuristic, llm_extracted)",
                        self.query_mode
                    ),
                )],
            ),
        }
    }

    pub fn issues(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if !(0.0..=1.0).contains(&self.consensus_threshold) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ThresholdOutOfRange,
                format!(
                    "pipeline.consensus_threshold: {} is outside [0, 1]",
                    self.consensus_threshold
                ),
            ));
        }

        if self.num_rationales == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroRationales,
                "pipeline.num_rationales must be at least 1",
            ));
        }
        if self.fact_verification_rationales == Some(0) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroRationales,
                "pipeline.fact_verification_rationales must be at least 1",
            ));
        }

        if !self.early_stopping {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::EarlyStoppingDisabled,
                "pipeline.early_stopping is off: every question goes through correction and consolidation",
            ));
        }

        issues.extend(self.parse_query_mode().1);
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_mode() {
        let config = FilePipelineConfig {
            query_mode: "llm-extracted".to_string(),
            ..Default::default()
        };
        let (mode, issues) = config.parse_query_mode();
        assert_eq!(mode, QueryMode::LlmExtracted);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_invalid_query_mode_warns() {
        let config = FilePipelineConfig {
            query_mode: "magic".to_string(),
            ..Default::default()
        };
        let (mode, issues) = config.parse_query_mode();
        assert_eq!(mode, QueryMode::Heuristic);
        assert_eq!(issues.len(), 1);
        assert!(!issues[0].is_error());
    }

    #[test]
    fn test_threshold_out_of_range() {
        let config = FilePipelineConfig {
            consensus_threshold: 1.5,
            ..Default::default()
        };
        let issues = config.issues();
        assert!(
            issues
                .iter()
                .any(|i| i.code == ConfigIssueCode::ThresholdOutOfRange && i.is_error())
        );
    }

    #[test]
    fn test_zero_rationales() {
        let config = FilePipelineConfig {
            num_rationales: 0,
            fact_verification_rationales: Some(0),
            ..Default::default()
        };
        let count = config
            .issues()
            .iter()
            .filter(|i| i.code == ConfigIssueCode::ZeroRationales)
            .count();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_defaults_are_clean() {
        assert!(FilePipelineConfig::default().issues().is_empty());
    }
}
