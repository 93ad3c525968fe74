//! LLM client abstraction layer
//!
//! This module provides a trait-based abstraction for LLM communication,
//! allowing different backends (GenAI, Mock) to be used interchangeably, plus
//! the schema-constrained generation helper every pipeline stage goes through.

mod client;
mod error;
mod genai;
mod mock;
mod selector;
mod structured;
mod types;

pub use client::LLMClient;
pub use error::BackendError;
pub use genai::{GenAIClient, API_BASE_URL_ENV};
pub use mock::{MockCall, MockLLMClient, MockResponse};
pub use selector::{
    is_ollama_available, provider_has_credentials, select_llm_client, SelectedClient,
};
pub use structured::{generate_structured, StructuredRequest};
pub use types::{ChatMessage, LLMRequest, LLMResponse, MessageRole};
