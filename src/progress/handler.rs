//! Progress handler trait and events

use std::time::Duration;

/// Events emitted while a WBS is being built
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Build started for the named business
    Started { business: String },

    /// A pipeline stage started
    StageStarted { stage: String },

    /// A pipeline stage finished
    StageComplete { stage: String, duration: Duration },

    /// One workstream finished generating; `current` is 1-based
    StreamGenerated {
        current: usize,
        total: usize,
        name: String,
    },

    /// Dependency linking failed and the sequential chain was used
    DependencyFallback { reason: String },

    /// Build finished
    Completed {
        workstreams: usize,
        confidence: f64,
        total_time: Duration,
    },

    /// Build failed
    Failed { error: String },
}

/// Trait for handling progress events during a build
pub trait ProgressHandler: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}
