//! Human-facing progress feedback for the pipeline phases.

/// Start / overwrite / end progress indicator.
pub trait ProgressReporter: Send + Sync {
    /// Called when a phase begins.
    fn start(&self, phase: &str);
    /// Replace the current progress line.
    fn update(&self, message: &str);
    /// Called when the phase finishes.
    fn end(&self);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn start(&self, _phase: &str) {}
    fn update(&self, _message: &str) {}
    fn end(&self) {}
}
