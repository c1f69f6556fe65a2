//! Port for the structured run transcript.
//!
//! Defines the [`ConversationLogger`] trait for recording pipeline events
//! (generated rationales, fused evidence, corrections, consensus decisions)
//! to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the run
//! transcript in a machine-readable format (JSONL).

use serde_json::Value;

/// Event type names written by the pipeline.
pub mod events {
    pub const RATIONALES_GENERATED: &str = "rationales_generated";
    pub const EVIDENCE_FUSED: &str = "evidence_fused";
    pub const RATIONALE_CORRECTED: &str = "rationale_corrected";
    pub const CONSENSUS_EVALUATED: &str = "consensus_evaluated";
    pub const CONSENSUS_VALIDATED: &str = "consensus_validated";
    pub const ANSWER_CONSOLIDATED: &str = "answer_consolidated";
    pub const PIPELINE_COMPLETED: &str = "pipeline_completed";
}

/// A structured transcript event.
///
/// The logger adds the timestamp when the event is written.
#[derive(Debug, Clone)]
pub struct ConversationEvent {
    /// Event type identifier, one of [`events`].
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging transcript events.
///
/// `log` is synchronous and infallible; a failing logger must not disturb the
/// run, so implementations swallow their own I/O errors.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when the transcript is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
