//! Configuration issues reported by validation.
//!
//! Validation never fails outright; it returns every problem it finds with a
//! severity, and the caller decides whether to abort.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// Consensus threshold outside `[0, 1]`.
    ThresholdOutOfRange,
    /// `num_rationales` (or the fact-verification override) is zero.
    ZeroRationales,
    /// A timeout or wait bound is zero.
    ZeroTimeout,
    /// A snippet limit is zero, so no evidence could ever reach a correction.
    ZeroSnippetLimit,
    /// `max_attempts` is zero, so no call would ever be made.
    ZeroAttempts,
    /// A retrieval source name is not registered.
    UnknownSource,
    /// No retrieval sources configured; every correction runs without evidence.
    NoSources,
    /// The completion model name is empty.
    EmptyModel,
    /// The local corpus source is enabled without a corpus path.
    MissingCorpusPath,
    /// Early stopping disabled: every run consolidates.
    EarlyStoppingDisabled,
    /// A string field holds a value outside its known set.
    InvalidEnumValue,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", level, self.message)
    }
}
