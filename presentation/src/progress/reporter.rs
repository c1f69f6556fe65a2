//! Progress reporting for pipeline runs

use cok_application::ports::progress::PipelineProgress;
use cok_domain::{Degradation, PipelineState, RationaleId};
use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// Reports progress with one indicatif bar (or spinner) per state
pub struct ProgressReporter {
    multi: MultiProgress,
    state_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            state_bar: Mutex::new(None),
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineProgress for ProgressReporter {
    fn on_state_enter(&self, state: PipelineState, total_tasks: usize) {
        let pb = if total_tasks > 0 {
            let pb = self.multi.add(ProgressBar::new(total_tasks as u64));
            pb.set_style(Self::bar_style());
            pb
        } else {
            let pb = self.multi.add(ProgressBar::new_spinner());
            pb.set_style(Self::spinner_style());
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        };
        pb.set_prefix(state.display_name());
        pb.set_message("Starting...");

        if let Ok(mut slot) = self.state_bar.lock() {
            *slot = Some(pb);
        }
    }

    fn on_rationale_complete(&self, _state: PipelineState, id: RationaleId, success: bool) {
        if let Ok(slot) = self.state_bar.lock()
            && let Some(pb) = slot.as_ref()
        {
            let status = if success {
                format!("{} {}", "v".green(), id)
            } else {
                format!("{} {}", "x".red(), id)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_state_complete(&self, state: PipelineState) {
        if let Ok(mut slot) = self.state_bar.lock()
            && let Some(pb) = slot.take()
        {
            pb.finish_with_message(format!("{} done", state.display_name().green()));
        }
    }

    fn on_degradation(&self, degradation: &Degradation) {
        let _ = self
            .multi
            .println(format!("  {} {}", "!".yellow().bold(), degradation));
    }
}

/// Plain line-per-event progress on stderr (no fancy UI)
pub struct SimpleProgress;

impl PipelineProgress for SimpleProgress {
    fn on_state_enter(&self, state: PipelineState, total_tasks: usize) {
        if total_tasks > 0 {
            eprintln!(
                "{} {} ({} rationales)",
                "->".cyan(),
                state.display_name().bold(),
                total_tasks
            );
        } else {
            eprintln!("{} {}", "->".cyan(), state.display_name().bold());
        }
    }

    fn on_rationale_complete(&self, _state: PipelineState, id: RationaleId, success: bool) {
        if success {
            eprintln!("  {} {}", "v".green(), id);
        } else {
            eprintln!("  {} {} (failed)", "x".red(), id);
        }
    }

    fn on_state_complete(&self, _state: PipelineState) {}

    fn on_degradation(&self, degradation: &Degradation) {
        eprintln!("  {} {}", "!".yellow(), degradation);
    }
}
