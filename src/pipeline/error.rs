use crate::llm::BackendError;
use crate::output::InitiativeType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{stage} LLM call failed: {source}")]
    Llm {
        stage: &'static str,
        #[source]
        source: BackendError,
    },

    #[error("Invalid {stage} output: {message}")]
    InvalidOutput {
        stage: &'static str,
        message: String,
    },

    #[error("Pattern for {initiative_type} sums to {total:.1}%, outside the 100 ± 5 tolerance")]
    InvalidPattern {
        initiative_type: InitiativeType,
        total: f64,
    },

    #[error("Strategy profiling failed: {0}")]
    Strategy(String),
}

impl PipelineError {
    /// Adapter for `map_err` on calls made by `stage`
    pub fn llm(stage: &'static str) -> impl FnOnce(BackendError) -> Self {
        move |source| PipelineError::Llm { stage, source }
    }

    pub fn stage(&self) -> Option<&'static str> {
        match self {
            PipelineError::Llm { stage, .. } | PipelineError::InvalidOutput { stage, .. } => {
                Some(*stage)
            }
            PipelineError::InvalidPattern { .. } => Some("pattern"),
            PipelineError::Strategy(_) => None,
        }
    }
}
