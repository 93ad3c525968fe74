use super::error::BackendError;
use super::types::{LLMRequest, LLMResponse};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait LLMClient: Send + Sync {
    async fn chat(&self, request: LLMRequest) -> Result<LLMResponse, BackendError>;

    fn name(&self) -> &str;

    fn model_info(&self) -> Option<String> {
        None
    }

    /// Returns a client bound to a different model of the same provider.
    ///
    /// `None` means the provider cannot switch models and callers keep using
    /// this client.
    fn with_model(&self, _model: &str) -> Option<Arc<dyn LLMClient>> {
        None
    }
}
