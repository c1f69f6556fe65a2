//! Progress notification port
//!
//! Defines the interface for reporting progress during a pipeline run.

use cok_domain::{Degradation, PipelineState, RationaleId};

/// Callback for progress updates during a pipeline run
///
/// Implementations live in the presentation layer. All callbacks are made
/// from the orchestrating task, never from inside spawned work.
pub trait PipelineProgress: Send + Sync {
    /// Called when a state is entered. `total_tasks` is the number of
    /// rationale-level tasks in that state (0 for single-call states).
    fn on_state_enter(&self, state: PipelineState, total_tasks: usize);

    /// Called when one rationale finishes within a state
    fn on_rationale_complete(&self, state: PipelineState, id: RationaleId, success: bool);

    /// Called when a state is left
    fn on_state_complete(&self, state: PipelineState);

    /// Called for every recoverable degradation
    fn on_degradation(&self, _degradation: &Degradation) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl PipelineProgress for NoProgress {
    fn on_state_enter(&self, _state: PipelineState, _total_tasks: usize) {}
    fn on_rationale_complete(&self, _state: PipelineState, _id: RationaleId, _success: bool) {}
    fn on_state_complete(&self, _state: PipelineState) {}
}
