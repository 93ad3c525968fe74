use super::client::LLMClient;
use super::error::BackendError;
use super::types::{LLMRequest, LLMResponse};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const DEFAULT_MOCK_MODEL: &str = "mock-model";

/// Scripted LLM client for tests.
///
/// Responses are served in FIFO order. Clients derived through
/// [`LLMClient::with_model`] share the same queue and call log, so a test can
/// script a whole pipeline run on one instance and still observe which model
/// each request went to.
pub struct MockLLMClient {
    state: Arc<Mutex<MockState>>,
    name: String,
    model: String,
    supports_model_switch: bool,
}

#[derive(Default)]
struct MockState {
    responses: VecDeque<MockResponse>,
    calls: Vec<MockCall>,
}

#[derive(Debug, Clone)]
pub struct MockResponse {
    pub content: String,
    pub error: Option<BackendError>,
}

/// A request observed by the mock, with the model it was routed to
#[derive(Debug, Clone)]
pub struct MockCall {
    pub model: String,
    pub request: LLMRequest,
}

impl MockResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            error: None,
        }
    }

    pub fn json(value: serde_json::Value) -> Self {
        Self::text(value.to_string())
    }

    pub fn error(error: BackendError) -> Self {
        Self {
            content: String::new(),
            error: Some(error),
        }
    }
}

impl MockLLMClient {
    pub fn new() -> Self {
        Self::with_name("MockLLM")
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
            name: name.into(),
            model: DEFAULT_MOCK_MODEL.to_string(),
            supports_model_switch: true,
        }
    }

    /// Disables [`LLMClient::with_model`], mimicking a single-model provider
    pub fn without_model_switching(mut self) -> Self {
        self.supports_model_switch = false;
        self
    }

    pub fn add_response(&self, response: MockResponse) {
        self.lock().responses.push_back(response);
    }

    pub fn add_responses(&self, responses: impl IntoIterator<Item = MockResponse>) {
        let mut state = self.lock();
        for response in responses {
            state.responses.push_back(response);
        }
    }

    pub fn remaining_responses(&self) -> usize {
        self.lock().responses.len()
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        // A poisoned lock only means another test thread panicked mid-push.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MockLLMClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn chat(&self, request: LLMRequest) -> Result<LLMResponse, BackendError> {
        let response = {
            let mut state = self.lock();
            state.calls.push(MockCall {
                model: self.model.clone(),
                request,
            });
            state.responses.pop_front()
        }
        .ok_or_else(|| BackendError::other("MockLLMClient: No more responses in queue"))?;

        if let Some(error) = response.error {
            return Err(error);
        }

        Ok(LLMResponse::text(response.content, Duration::from_millis(10)))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn model_info(&self) -> Option<String> {
        Some(self.model.clone())
    }

    fn with_model(&self, model: &str) -> Option<Arc<dyn LLMClient>> {
        if !self.supports_model_switch {
            return None;
        }

        Some(Arc::new(MockLLMClient {
            state: Arc::clone(&self.state),
            name: self.name.clone(),
            model: model.to_string(),
            supports_model_switch: true,
        }))
    }
}

impl std::fmt::Debug for MockLLMClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockLLMClient")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("remaining_responses", &self.remaining_responses())
            .finish()
    }
}
