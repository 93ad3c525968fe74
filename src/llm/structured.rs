//! Schema-constrained generation on top of [`LLMClient`]
//!
//! Every stage of the pipeline asks the model for a single JSON object. The
//! schema is embedded in the prompt and the response is deserialized straight
//! into the stage's typed output, so any shape violation surfaces as a
//! [`BackendError::ParseError`] instead of a partially filled value.

use super::client::LLMClient;
use super::error::BackendError;
use super::types::{ChatMessage, LLMRequest};
use crate::heuristics::HeuristicLogger;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Instant;
use tracing::debug;

const SYSTEM_PROMPT: &str = "You are a senior program management consultant. \
You answer with a single JSON object that conforms exactly to the JSON schema you are given. \
Do not wrap the JSON in markdown and do not add commentary.";

/// A single structured-generation call
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    /// Stage name, used for logging and error context
    pub stage: &'static str,
    pub prompt: String,
    /// JSON-schema-like description of the expected object
    pub schema: serde_json::Value,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl StructuredRequest {
    pub fn new(stage: &'static str, prompt: String, schema: serde_json::Value) -> Self {
        Self {
            stage,
            prompt,
            schema,
            temperature: 0.3,
            max_tokens: 4096,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn to_llm_request(&self) -> LLMRequest {
        let schema = serde_json::to_string_pretty(&self.schema)
            .unwrap_or_else(|_| self.schema.to_string());
        let user = format!(
            "{}\n\nRespond with JSON matching this schema:\n{}",
            self.prompt, schema
        );

        LLMRequest::new(vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user)])
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
    }
}

pub(crate) fn extract_json_from_markdown(content: &str) -> &str {
    let trimmed = content.trim();

    if let Some(start_idx) = trimmed.find("```json") {
        let after_fence = &trimmed[start_idx + 7..];
        if let Some(end_idx) = after_fence.find("```") {
            return after_fence[..end_idx].trim();
        }
    }

    if let Some(start_idx) = trimmed.find("```") {
        let after_fence = &trimmed[start_idx + 3..];
        if let Some(end_idx) = after_fence.find("```") {
            return after_fence[..end_idx].trim();
        }
    }

    trimmed
}

/// Runs one structured-generation call and deserializes the answer into `T`.
pub async fn generate_structured<T>(
    client: &dyn LLMClient,
    request: StructuredRequest,
    logger: &HeuristicLogger,
) -> Result<T, BackendError>
where
    T: DeserializeOwned + Serialize,
{
    let start = Instant::now();
    let llm_request = request.to_llm_request();

    debug!(
        stage = request.stage,
        client = client.name(),
        prompt_chars = request.prompt.len(),
        "Sending structured request"
    );

    let response = client.chat(llm_request.clone()).await?;
    let latency_ms = start.elapsed().as_millis() as u64;

    let json_content = extract_json_from_markdown(&response.content);
    let parsed: T = serde_json::from_str(json_content).map_err(|e| BackendError::ParseError {
        message: e.to_string(),
        context: format!("{} response: {}", request.stage, truncate(json_content, 400)),
    })?;

    logger.log_stage(request.stage, &llm_request, &parsed, latency_ms);
    debug!(stage = request.stage, latency_ms, "Structured response parsed");

    Ok(parsed)
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
