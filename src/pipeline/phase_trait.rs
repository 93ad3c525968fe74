use super::error::PipelineError;
use async_trait::async_trait;

/// One step of the WBS pipeline. Stages run strictly in sequence; each
/// stage's output feeds the next one's input.
#[async_trait]
pub trait PipelineStage: Send + Sync {
    type Input: Send + Sync;
    type Output: Send;

    fn name(&self) -> &'static str;

    async fn process(&self, input: &Self::Input) -> Result<Self::Output, PipelineError>;
}
