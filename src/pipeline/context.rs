//! Shared dependencies handed to every pipeline stage

use std::sync::Arc;

use crate::heuristics::HeuristicLogger;
use crate::llm::{LLMClient, StructuredRequest};
use crate::progress::{NoOpHandler, ProgressEvent, ProgressHandler};

use super::config::PipelineConfig;

/// Owns the long-lived pipeline dependencies. Cheap to clone.
#[derive(Clone)]
pub struct PipelineContext {
    pub llm_client: Arc<dyn LLMClient>,

    /// Records every structured exchange when enabled
    pub heuristic_logger: Arc<HeuristicLogger>,

    pub progress_handler: Arc<dyn ProgressHandler>,

    pub config: PipelineConfig,
}

impl PipelineContext {
    pub fn new(llm_client: Arc<dyn LLMClient>) -> Self {
        Self {
            llm_client,
            heuristic_logger: Arc::new(HeuristicLogger::disabled()),
            progress_handler: Arc::new(NoOpHandler),
            config: PipelineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_heuristic_logger(mut self, logger: Arc<HeuristicLogger>) -> Self {
        self.heuristic_logger = logger;
        self
    }

    pub fn with_progress_handler(mut self, handler: Arc<dyn ProgressHandler>) -> Self {
        self.progress_handler = handler;
        self
    }

    pub fn report(&self, event: ProgressEvent) {
        self.progress_handler.on_progress(&event);
    }

    /// Structured request carrying the configured sampling parameters
    pub fn structured_request(
        &self,
        stage: &'static str,
        prompt: String,
        schema: serde_json::Value,
    ) -> StructuredRequest {
        StructuredRequest::new(stage, prompt, schema)
            .with_temperature(self.config.temperature)
            .with_max_tokens(self.config.max_tokens)
    }

    /// Client for dependency linking: the configured fast model when the
    /// provider can switch models, otherwise the primary client.
    pub fn dependency_client(&self) -> Arc<dyn LLMClient> {
        self.config
            .dependency_model
            .as_deref()
            .and_then(|model| self.llm_client.with_model(model))
            .unwrap_or_else(|| self.llm_client.clone())
    }
}
