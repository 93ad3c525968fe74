use super::{GenAIClient, LLMClient};
use crate::config::WbsConfig;
use anyhow::Result;
use genai::adapter::AdapterKind;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const DEFAULT_OLLAMA_FALLBACK_MODEL: &str = "qwen2.5:7b";

pub struct SelectedClient {
    pub client: Arc<dyn LLMClient>,
    pub provider: AdapterKind,
    pub model: String,
    pub description: String,
}

/// Picks the configured provider when its credentials are present, otherwise a
/// locally running Ollama.
pub async fn select_llm_client(config: &WbsConfig) -> Result<SelectedClient> {
    if let Some(selected) = try_configured_provider(config).await {
        return Ok(selected);
    }

    if let Some(selected) = try_ollama(config).await {
        return Ok(selected);
    }

    Err(anyhow::anyhow!(
        "No LLM backend available. Please either:\n\
         - Set an API key (ANTHROPIC_API_KEY, OPENAI_API_KEY, etc.) and PREMISIA_PROVIDER\n\
         - Start Ollama locally (ollama serve)"
    ))
}

async fn try_configured_provider(config: &WbsConfig) -> Option<SelectedClient> {
    let provider = config.provider;

    if provider == AdapterKind::Ollama {
        debug!("Skipping Ollama in configured provider check - will check availability separately");
        return None;
    }

    if !provider_has_credentials(provider) {
        debug!("Skipping {} - no credentials available", provider);
        return None;
    }

    match GenAIClient::new(
        provider,
        config.model.clone(),
        Duration::from_secs(config.request_timeout_secs),
    )
    .await
    {
        Ok(client) => {
            info!("Using configured provider: {} ({})", provider, config.model);
            Some(SelectedClient {
                client: Arc::new(client),
                provider,
                model: config.model.clone(),
                description: format!("{} ({})", provider, config.model),
            })
        }
        Err(e) => {
            warn!("Failed to initialize {}: {}", provider, e);
            None
        }
    }
}

async fn try_ollama(config: &WbsConfig) -> Option<SelectedClient> {
    if !is_ollama_available().await {
        debug!("Ollama not available");
        return None;
    }

    let model = if config.provider == AdapterKind::Ollama {
        config.model.clone()
    } else {
        DEFAULT_OLLAMA_FALLBACK_MODEL.to_string()
    };

    match GenAIClient::new(
        AdapterKind::Ollama,
        model.clone(),
        Duration::from_secs(config.request_timeout_secs),
    )
    .await
    {
        Ok(client) => {
            info!("Using Ollama with model: {}", model);
            Some(SelectedClient {
                client: Arc::new(client),
                provider: AdapterKind::Ollama,
                description: format!("Ollama ({})", model),
                model,
            })
        }
        Err(e) => {
            warn!("Failed to initialize Ollama: {}", e);
            None
        }
    }
}

/// Check if provider has available credentials
pub fn provider_has_credentials(provider: AdapterKind) -> bool {
    match provider.default_key_env_name() {
        None => true,
        Some(env_var) => std::env::var(env_var).is_ok(),
    }
}

/// Check if Ollama is running locally
pub async fn is_ollama_available() -> bool {
    let base_url =
        std::env::var("OLLAMA_HOST").unwrap_or_else(|_| "http://localhost:11434".to_string());

    let url = format!("{}/api/tags", base_url);

    match reqwest::Client::new()
        .get(&url)
        .timeout(Duration::from_secs(2))
        .send()
        .await
    {
        Ok(resp) => {
            let available = resp.status().is_success();
            debug!("Ollama availability check: {}", available);
            available
        }
        Err(e) => {
            debug!("Ollama not available: {}", e);
            false
        }
    }
}
