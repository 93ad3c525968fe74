//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{debug, error, info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started { business } => {
                info!(business = %business, "Starting WBS generation");
            }
            ProgressEvent::StageStarted { stage } => {
                debug!(stage = %stage, "Stage started");
            }
            ProgressEvent::StageComplete { stage, duration } => {
                info!(
                    stage = %stage,
                    duration_ms = duration.as_millis(),
                    "Stage complete"
                );
            }
            ProgressEvent::StreamGenerated {
                current,
                total,
                name,
            } => {
                info!(current, total, workstream = %name, "Workstream generated");
            }
            ProgressEvent::DependencyFallback { reason } => {
                warn!(reason = %reason, "Using sequential dependency fallback");
            }
            ProgressEvent::Completed {
                workstreams,
                confidence,
                total_time,
            } => {
                info!(
                    workstreams,
                    confidence,
                    total_time_ms = total_time.as_millis(),
                    "WBS generation complete"
                );
            }
            ProgressEvent::Failed { error } => {
                error!(error = %error, "WBS generation failed");
            }
        }
    }
}
