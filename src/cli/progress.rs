//! Terminal progress for `build`, drawn on stderr with indicatif

use crate::progress::{ProgressEvent, ProgressHandler};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const SPINNER_TEMPLATE: &str = "{spinner:.cyan} [{elapsed}] {msg}";

pub struct CliProgressHandler {
    bar: ProgressBar,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template(SPINNER_TEMPLATE) {
            bar.set_style(style);
        }
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar }
    }

    /// Draws nothing; used for `--quiet`
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn stage_label(stage: &str) -> &'static str {
    match stage {
        "analyzer" => "Classifying the initiative",
        "pattern" => "Selecting a workstream pattern",
        "weighter" => "Applying strategy weights",
        "optimizer" => "Generating workstreams",
        "validator" => "Validating against the objective",
        _ => "Working",
    }
}

impl ProgressHandler for CliProgressHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started { business } => {
                self.bar.set_message(format!("Planning {}", business));
            }
            ProgressEvent::StageStarted { stage } => {
                self.bar.set_message(stage_label(stage));
            }
            ProgressEvent::StageComplete { .. } => {}
            ProgressEvent::StreamGenerated {
                current,
                total,
                name,
            } => {
                self.bar
                    .set_message(format!("Generated workstream {}/{}: {}", current, total, name));
            }
            ProgressEvent::DependencyFallback { .. } => {
                self.bar
                    .println("\u{26A0} Dependency linking failed, using sequential order");
            }
            ProgressEvent::Completed {
                workstreams,
                total_time,
                ..
            } => {
                self.bar.finish_and_clear();
                self.bar.println(format!(
                    "\u{2713} {} workstreams in {:.1}s",
                    workstreams,
                    total_time.as_secs_f64()
                ));
            }
            ProgressEvent::Failed { error } => {
                self.bar.abandon_with_message(format!("\u{2717} {}", error));
            }
        }
    }
}
