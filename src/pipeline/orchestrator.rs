use super::confidence::compose_confidence;
use super::config::PipelineConfig;
use super::context::PipelineContext;
use super::error::PipelineError;
use super::phase_trait::PipelineStage;
use super::phases::{
    AdaptivePatternWeighter, AnalyzerInput, BusinessAnalyzer, OptimizerInput, PatternProvider,
    SemanticValidator, StreamOptimizer, StreamProgressCallback, ValidatorInput, WeighterInput,
};
use super::strategy::{resolve_profile, StrategyProfiler};
use crate::heuristics::HeuristicLogger;
use crate::llm::LLMClient;
use crate::output::{BusinessIntent, PlanningContext, StrategyProfile, Wbs, WorkStream};
use crate::patterns::PatternRegistry;
use crate::progress::{ProgressEvent, ProgressHandler};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Runs the full WBS pipeline: strategy profile (optional), analyzer,
/// pattern, weighter (only with a profile), optimizer, validator.
pub struct WbsBuilder {
    context: PipelineContext,
    registry: Arc<PatternRegistry>,
    strategy_profiler: Option<Arc<dyn StrategyProfiler>>,
}

impl WbsBuilder {
    pub fn new(llm_client: Arc<dyn LLMClient>) -> Self {
        Self {
            context: PipelineContext::new(llm_client),
            registry: Arc::new(PatternRegistry::with_defaults()),
            strategy_profiler: None,
        }
    }

    pub fn with_registry(mut self, registry: Arc<PatternRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.context = self.context.with_config(config);
        self
    }

    pub fn with_progress_handler(mut self, handler: Arc<dyn ProgressHandler>) -> Self {
        self.context = self.context.with_progress_handler(handler);
        self
    }

    pub fn with_heuristic_logger(mut self, logger: Arc<HeuristicLogger>) -> Self {
        self.context = self.context.with_heuristic_logger(logger);
        self
    }

    pub fn with_strategy_profiler(mut self, profiler: Arc<dyn StrategyProfiler>) -> Self {
        self.strategy_profiler = Some(profiler);
        self
    }

    pub fn registry(&self) -> &PatternRegistry {
        &self.registry
    }

    pub async fn build_wbs(
        &self,
        insights: &Value,
        planning: &PlanningContext,
    ) -> Result<Wbs, PipelineError> {
        let start = Instant::now();
        info!(business = %planning.business.name, "Starting WBS generation");
        self.context.report(ProgressEvent::Started {
            business: planning.business.name.clone(),
        });

        match self.run(insights, planning).await {
            Ok(wbs) => {
                let total_time = start.elapsed();
                info!(
                    workstreams = wbs.workstreams.len(),
                    confidence = wbs.confidence,
                    duration_ms = total_time.as_millis() as u64,
                    "WBS generation complete"
                );
                self.context.report(ProgressEvent::Completed {
                    workstreams: wbs.workstreams.len(),
                    confidence: wbs.confidence,
                    total_time,
                });
                Ok(wbs)
            }
            Err(e) => {
                self.context.report(ProgressEvent::Failed {
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        insights: &Value,
        planning: &PlanningContext,
    ) -> Result<Wbs, PipelineError> {
        let strategy_profile = self.strategy_profile(insights, planning).await;

        let analyzer_input = AnalyzerInput {
            insights: insights.clone(),
            context: planning.clone(),
            strategy_profile: strategy_profile.clone(),
        };
        let intent = self
            .run_stage(&BusinessAnalyzer::new(self.context.clone()), &analyzer_input)
            .await?;

        let provider = PatternProvider::new(self.context.clone(), Arc::clone(&self.registry));
        let mut pattern = self.run_stage(&provider, &intent).await?;

        if let Some(profile) = strategy_profile {
            pattern = self
                .run_stage(&AdaptivePatternWeighter, &WeighterInput { pattern, profile })
                .await?;
        }

        let optimizer_input = OptimizerInput::new(pattern, planning.clone(), insights.clone())
            .with_progress(self.stream_progress());
        let workstreams = self
            .run_stage(&StreamOptimizer::new(self.context.clone()), &optimizer_input)
            .await?;
        let OptimizerInput { pattern, .. } = optimizer_input;

        self.check_plugin_expectations(&intent, &workstreams);

        let validator_input = ValidatorInput {
            objective: planning.objective().to_string(),
            context: planning.clone(),
            workstreams,
        };
        let validation_report = self
            .run_stage(&SemanticValidator::new(self.context.clone()), &validator_input)
            .await?;
        let ValidatorInput { workstreams, .. } = validator_input;

        let stream_confidences: Vec<f64> = workstreams.iter().map(|w| w.confidence).collect();
        let confidence = compose_confidence(
            intent.confidence,
            validation_report.coherence_score,
            &stream_confidences,
        );

        Ok(Wbs {
            intent,
            pattern,
            workstreams,
            confidence,
            validation_report,
        })
    }

    async fn strategy_profile(
        &self,
        insights: &Value,
        planning: &PlanningContext,
    ) -> Option<StrategyProfile> {
        let profiler = self.strategy_profiler.as_ref()?;
        resolve_profile(profiler.as_ref(), insights, planning).await
    }

    async fn run_stage<S: PipelineStage>(
        &self,
        stage: &S,
        input: &S::Input,
    ) -> Result<S::Output, PipelineError> {
        let name = stage.name();
        debug!(stage = name, "Stage started");
        self.context.report(ProgressEvent::StageStarted {
            stage: name.to_string(),
        });

        let stage_start = Instant::now();
        let output = stage.process(input).await?;
        let duration = stage_start.elapsed();

        debug!(stage = name, duration_ms = duration.as_millis() as u64, "Stage complete");
        self.context.report(ProgressEvent::StageComplete {
            stage: name.to_string(),
            duration,
        });

        Ok(output)
    }

    fn stream_progress(&self) -> StreamProgressCallback {
        let handler = Arc::clone(&self.context.progress_handler);
        Arc::new(move |current: usize, total: usize, name: &str| {
            handler.on_progress(&ProgressEvent::StreamGenerated {
                current,
                total,
                name: name.to_string(),
            });
        })
    }

    fn check_plugin_expectations(&self, intent: &BusinessIntent, workstreams: &[WorkStream]) {
        if let Some(plugin) = self.registry.get_pattern(intent.initiative_type) {
            if !plugin.validate(workstreams) {
                warn!(
                    plugin = plugin.name(),
                    workstreams = workstreams.len(),
                    "Workstreams do not cover the categories the pattern requires"
                );
            }
        }
    }
}
