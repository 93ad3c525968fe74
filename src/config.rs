//! Configuration management for premisia-wbs
//!
//! Settings are loaded from environment variables with defaults. Provider
//! credentials and endpoints are read by the genai library itself.
//!
//! # Environment Variables
//!
//! - `PREMISIA_PROVIDER`: ollama|openai|claude|gemini|grok|groq - default: "ollama"
//! - `PREMISIA_MODEL`: Model name - default depends on the provider
//! - `PREMISIA_FAST_MODEL`: Model used for dependency linking - default depends on the provider
//! - `PREMISIA_REQUEST_TIMEOUT`: Timeout in seconds - default: "120"
//! - `PREMISIA_MAX_TOKENS`: Max tokens per structured call - default: "4096"
//! - `PREMISIA_TEMPERATURE`: Sampling temperature - default: "0.3"
//! - `PREMISIA_LOG_LEVEL`: Logging level - default: "info"
//! - `PREMISIA_HEURISTICS_LOG`: JSONL file recording every LLM exchange - default: unset
//! - `PREMISIA_API_BASE_URL`: Custom endpoint for the configured provider - default: unset
//!
//! Provider credentials: `OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, `GEMINI_API_KEY`,
//! `XAI_API_KEY`, `GROQ_API_KEY`. Ollama uses `OLLAMA_HOST`.
//!
//! # Example
//!
//! ```no_run
//! use premisia_wbs::WbsConfig;
//!
//! let config = WbsConfig::from_env().expect("Invalid configuration");
//! config.validate().expect("Invalid configuration");
//! let pipeline_config = config.pipeline_config();
//! ```

use crate::pipeline::PipelineConfig;
use genai::adapter::AdapterKind;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MAX_TOKENS: u32 = 4096;
const DEFAULT_TEMPERATURE: f32 = 0.3;

const ENV_PROVIDER: &str = "PREMISIA_PROVIDER";
const ENV_MODEL: &str = "PREMISIA_MODEL";
const ENV_FAST_MODEL: &str = "PREMISIA_FAST_MODEL";
const ENV_REQUEST_TIMEOUT: &str = "PREMISIA_REQUEST_TIMEOUT";
const ENV_MAX_TOKENS: &str = "PREMISIA_MAX_TOKENS";
const ENV_TEMPERATURE: &str = "PREMISIA_TEMPERATURE";
const ENV_LOG_LEVEL: &str = "PREMISIA_LOG_LEVEL";
const ENV_HEURISTICS_LOG: &str = "PREMISIA_HEURISTICS_LOG";

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid provider: {0}. Valid options: ollama, openai, claude, gemini, grok, groq")]
    InvalidProvider(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

/// Maps a provider name, including the aliases users commonly type, to its
/// genai adapter.
pub fn parse_provider(name: &str) -> Result<AdapterKind, ConfigError> {
    match name.trim().to_lowercase().as_str() {
        "ollama" => Ok(AdapterKind::Ollama),
        "openai" => Ok(AdapterKind::OpenAI),
        "claude" | "anthropic" => Ok(AdapterKind::Anthropic),
        "gemini" => Ok(AdapterKind::Gemini),
        "grok" | "xai" => Ok(AdapterKind::Xai),
        "groq" => Ok(AdapterKind::Groq),
        other => Err(ConfigError::InvalidProvider(other.to_string())),
    }
}

pub fn default_model(provider: AdapterKind) -> &'static str {
    match provider {
        AdapterKind::OpenAI => "gpt-4o",
        AdapterKind::Anthropic => "claude-3-5-sonnet-latest",
        AdapterKind::Gemini => "gemini-2.0-flash",
        AdapterKind::Xai => "grok-2-latest",
        AdapterKind::Groq => "llama-3.3-70b-versatile",
        _ => "qwen2.5:7b",
    }
}

/// Cheaper model used for dependency linking, for providers that have one
pub fn default_fast_model(provider: AdapterKind) -> Option<&'static str> {
    match provider {
        AdapterKind::Anthropic => Some("claude-3-5-haiku-latest"),
        AdapterKind::OpenAI => Some("gpt-4o-mini"),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct WbsConfig {
    pub provider: AdapterKind,

    pub model: String,

    /// Model for dependency linking; `None` uses `model`
    pub fast_model: Option<String>,

    pub request_timeout_secs: u64,

    pub max_tokens: u32,

    pub temperature: f32,

    /// trace, debug, info, warn or error
    pub log_level: String,

    pub heuristics_log: Option<PathBuf>,
}

impl Default for WbsConfig {
    fn default() -> Self {
        Self::for_provider(AdapterKind::Ollama)
    }
}

fn env_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    env_var(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| ConfigError::ParseError {
                field: key.to_string(),
                error: e.to_string(),
            })
        })
        .transpose()
}

impl WbsConfig {
    /// Defaults for `provider`, ignoring the environment
    pub fn for_provider(provider: AdapterKind) -> Self {
        Self {
            provider,
            model: default_model(provider).to_string(),
            fast_model: default_fast_model(provider).map(str::to_string),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            heuristics_log: None,
        }
    }

    /// Loads `PREMISIA_*` variables on top of the provider defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let provider = match env_var(ENV_PROVIDER) {
            Some(name) => parse_provider(&name)?,
            None => AdapterKind::Ollama,
        };

        let mut config = Self::for_provider(provider);

        if let Some(model) = env_var(ENV_MODEL) {
            config.model = model;
        }
        if let Some(fast_model) = env_var(ENV_FAST_MODEL) {
            config.fast_model = Some(fast_model);
        }
        if let Some(timeout) = parse_env::<u64>(ENV_REQUEST_TIMEOUT)? {
            config.request_timeout_secs = timeout;
        }
        if let Some(max_tokens) = parse_env::<u32>(ENV_MAX_TOKENS)? {
            config.max_tokens = max_tokens;
        }
        if let Some(temperature) = parse_env::<f32>(ENV_TEMPERATURE)? {
            config.temperature = temperature;
        }
        if let Some(level) = env_var(ENV_LOG_LEVEL) {
            config.log_level = level.to_lowercase();
        }
        config.heuristics_log = env_var(ENV_HEURISTICS_LOG).map(PathBuf::from);

        Ok(config)
    }

    /// Switches provider, resetting the models to that provider's defaults
    pub fn with_provider(mut self, provider: AdapterKind) -> Self {
        if provider != self.provider {
            self.provider = provider;
            self.model = default_model(provider).to_string();
            self.fast_model = default_fast_model(provider).map(str::to_string);
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=3600).contains(&self.request_timeout_secs) {
            return Err(ConfigError::ValidationFailed(format!(
                "Request timeout must be between 1 and 3600 seconds, got {}",
                self.request_timeout_secs
            )));
        }

        if !(256..=200_000).contains(&self.max_tokens) {
            return Err(ConfigError::ValidationFailed(format!(
                "Max tokens must be between 256 and 200000, got {}",
                self.max_tokens
            )));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationFailed(format!(
                "Temperature must be between 0 and 2, got {}",
                self.temperature
            )));
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Model name cannot be empty".to_string(),
            ));
        }

        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid log level: {}. Valid options: {}",
                self.log_level,
                VALID_LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::new()
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);
        if let Some(fast_model) = &self.fast_model {
            config = config.with_dependency_model(fast_model.clone());
        }
        config
    }
}

impl fmt::Display for WbsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Premisia WBS Configuration:")?;
        writeln!(f, "  Provider: {}", self.provider)?;
        writeln!(f, "  Model: {}", self.model)?;
        writeln!(
            f,
            "  Fast Model: {}",
            self.fast_model.as_deref().unwrap_or("(same as model)")
        )?;
        writeln!(f, "  Request Timeout: {}s", self.request_timeout_secs)?;
        writeln!(f, "  Max Tokens: {}", self.max_tokens)?;
        writeln!(f, "  Temperature: {}", self.temperature)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        if let Some(path) = &self.heuristics_log {
            writeln!(f, "  Heuristics Log: {}", path.display())?;
        }
        Ok(())
    }
}
