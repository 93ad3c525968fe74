//! Optional strategy signal feeding the analyzer and the pattern weighter

use super::error::PipelineError;
use crate::output::{PlanningContext, StrategyProfile};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Derives a [`StrategyProfile`] from upstream analysis. `Ok(None)` means the
/// analysis carries no strategic signal.
#[async_trait]
pub trait StrategyProfiler: Send + Sync {
    fn name(&self) -> &str;

    async fn profile(
        &self,
        insights: &Value,
        context: &PlanningContext,
    ) -> Result<Option<StrategyProfile>, PipelineError>;
}

/// Returns the same profile for every build
#[derive(Debug, Clone)]
pub struct StaticStrategyProfiler {
    profile: StrategyProfile,
}

impl StaticStrategyProfiler {
    pub fn new(profile: StrategyProfile) -> Self {
        Self { profile }
    }
}

#[async_trait]
impl StrategyProfiler for StaticStrategyProfiler {
    fn name(&self) -> &str {
        "static"
    }

    async fn profile(
        &self,
        _insights: &Value,
        _context: &PlanningContext,
    ) -> Result<Option<StrategyProfile>, PipelineError> {
        Ok(Some(self.profile.clone()))
    }
}

/// Runs `profiler`, logging and discarding any failure
pub async fn resolve_profile(
    profiler: &dyn StrategyProfiler,
    insights: &Value,
    context: &PlanningContext,
) -> Option<StrategyProfile> {
    match profiler.profile(insights, context).await {
        Ok(Some(profile)) => {
            info!(
                profiler = profiler.name(),
                archetype = %profile.archetype,
                adjustments = profile.effort_adjustments.len(),
                "Strategy profile resolved"
            );
            Some(profile)
        }
        Ok(None) => {
            debug!(profiler = profiler.name(), "No strategy profile");
            None
        }
        Err(e) => {
            warn!(
                profiler = profiler.name(),
                error = %e,
                "Strategy profiling failed, continuing without a profile"
            );
            None
        }
    }
}
