//! Command handlers. Each returns the process exit code.

use super::commands::{BuildArgs, HealthArgs, PatternsArgs};
use super::output::{
    HealthStatus, OutputFormat, OutputFormatter, PatternSummary, ReportMetadata, WbsReport,
};
use super::progress::CliProgressHandler;
use crate::config::WbsConfig;
use crate::heuristics::HeuristicLogger;
use crate::llm::{is_ollama_available, provider_has_credentials, select_llm_client};
use crate::output::{
    BusinessContext, BusinessIntent, PlanningContext, StrategyProfile, TechnologyRole,
};
use crate::patterns::PatternRegistry;
use crate::pipeline::{StaticStrategyProfiler, WbsBuilder};
use crate::progress::{LoggingHandler, ProgressHandler};
use anyhow::{Context, Result};
use chrono::Utc;
use genai::adapter::AdapterKind;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, IsTerminal};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

const ALL_PROVIDERS: &[AdapterKind] = &[
    AdapterKind::Ollama,
    AdapterKind::OpenAI,
    AdapterKind::Anthropic,
    AdapterKind::Gemini,
    AdapterKind::Xai,
    AdapterKind::Groq,
];

pub async fn handle_build(args: &BuildArgs, quiet: bool) -> i32 {
    match run_build(args, quiet).await {
        Ok(()) => 0,
        Err(e) => {
            error!("{:#}", e);
            1
        }
    }
}

pub fn handle_patterns(args: &PatternsArgs) -> i32 {
    let registry = PatternRegistry::with_defaults();
    let summaries = summarize_patterns(&registry);

    match OutputFormatter::new(args.format.into()).format_patterns(&summaries) {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            error!("Failed to format patterns: {:#}", e);
            1
        }
    }
}

pub async fn handle_health(args: &HealthArgs) -> i32 {
    info!("Checking backend health");

    let providers: Vec<AdapterKind> = match args.backend {
        Some(provider) => vec![provider],
        None => ALL_PROVIDERS.to_vec(),
    };

    let mut results = BTreeMap::new();
    for provider in providers {
        debug!("Checking {} provider", provider);
        results.insert(provider.to_string(), check_provider(provider).await);
    }

    let output = match OutputFormatter::new(args.format.into()).format_health(&results) {
        Ok(output) => output,
        Err(e) => {
            error!("Failed to format health output: {:#}", e);
            return 1;
        }
    };
    println!("{}", output);

    if results.values().any(|s| s.available) {
        0
    } else {
        1
    }
}

async fn check_provider(provider: AdapterKind) -> HealthStatus {
    if provider == AdapterKind::Ollama {
        let host =
            std::env::var("OLLAMA_HOST").unwrap_or_else(|_| "http://localhost:11434".to_string());
        return if is_ollama_available().await {
            HealthStatus::available(format!("Connected to {}", host))
        } else {
            warn!("Ollama is not available at {}", host);
            HealthStatus::unavailable(format!("Cannot connect to {}", host))
                .with_details("Ensure Ollama is running: ollama serve")
        };
    }

    if provider_has_credentials(provider) {
        HealthStatus::available("API key is configured")
    } else {
        let key = provider.default_key_env_name().unwrap_or("API key");
        HealthStatus::unavailable("API key not configured")
            .with_details(format!("Set {} environment variable", key))
    }
}

async fn run_build(args: &BuildArgs, quiet: bool) -> Result<()> {
    let config = build_config(args)?;
    debug!("{}", config);

    let insights = read_insights(&args.insights)?;
    let mut planning = read_planning_context(&args.context)?;
    if let Some(objective) = &args.objective {
        planning = planning.with_objective(objective.clone());
    }
    let strategy_profile: Option<StrategyProfile> = args
        .strategy_profile
        .as_deref()
        .map(read_structured)
        .transpose()?;

    let selected = select_llm_client(&config).await?;
    info!("Using {}", selected.description);

    let progress: Arc<dyn ProgressHandler> = if quiet {
        Arc::new(CliProgressHandler::hidden())
    } else if io::stderr().is_terminal() {
        Arc::new(CliProgressHandler::new())
    } else {
        // no spinner when stderr is redirected; progress goes to the log instead
        Arc::new(LoggingHandler)
    };

    let mut pipeline_config = config.pipeline_config();
    if selected.provider != config.provider {
        // the fast model belongs to the configured provider, not the fallback
        pipeline_config.dependency_model = None;
    }

    let mut builder = WbsBuilder::new(selected.client.clone())
        .with_config(pipeline_config)
        .with_progress_handler(progress)
        .with_heuristic_logger(Arc::new(HeuristicLogger::new(config.heuristics_log.clone())));
    if let Some(profile) = strategy_profile {
        builder = builder.with_strategy_profiler(Arc::new(StaticStrategyProfiler::new(profile)));
    }

    let start = Instant::now();
    let wbs = builder
        .build_wbs(&insights, &planning)
        .await
        .context("WBS generation failed")?;

    let report = WbsReport {
        metadata: ReportMetadata {
            business: planning.business.name.clone(),
            generated_at: Utc::now(),
            generation_time_ms: start.elapsed().as_millis() as u64,
            provider: selected.provider.to_string(),
            model: selected.model.clone(),
        },
        wbs,
    };

    let format: OutputFormat = args.format.into();
    let output = OutputFormatter::new(format).format_report(&report)?;

    match &args.output {
        Some(path) => {
            fs::write(path, &output)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            info!("Wrote WBS to {}", path.display());
        }
        None => println!("{}", output),
    }

    Ok(())
}

/// Environment config with command-line overrides applied
fn build_config(args: &BuildArgs) -> Result<WbsConfig> {
    let mut config = WbsConfig::from_env().context("Invalid environment configuration")?;

    if let Some(provider) = args.backend {
        config = config.with_provider(provider);
    }
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(fast_model) = &args.fast_model {
        config.fast_model = Some(fast_model.clone());
    }
    if let Some(timeout) = args.timeout {
        config.request_timeout_secs = timeout;
    }
    if let Some(path) = &args.heuristics_log {
        config.heuristics_log = Some(path.clone());
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Reads a JSON or YAML file, chosen by extension
pub(crate) fn read_structured<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    if is_yaml(path) {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML in {}", path.display()))
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON in {}", path.display()))
    }
}

/// Structured insights when the file parses, otherwise its raw text
pub(crate) fn read_insights(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read insights from {}", path.display()))?;

    let parsed = if is_yaml(path) {
        serde_yaml::from_str::<Value>(&content).ok()
    } else {
        serde_json::from_str::<Value>(&content).ok()
    };

    Ok(match parsed {
        Some(value @ (Value::Object(_) | Value::Array(_))) => value,
        _ => Value::String(content),
    })
}

/// Accepts either a full planning context or a bare business context
pub(crate) fn read_planning_context(path: &Path) -> Result<PlanningContext> {
    let value: Value = read_structured(path)?;

    if value.get("business").is_some() {
        serde_json::from_value(value)
            .with_context(|| format!("Invalid planning context in {}", path.display()))
    } else {
        let business: BusinessContext = serde_json::from_value(value)
            .with_context(|| format!("Invalid business context in {}", path.display()))?;
        Ok(PlanningContext::new(business))
    }
}

fn summarize_patterns(registry: &PatternRegistry) -> Vec<PatternSummary> {
    registry
        .get_all_patterns()
        .iter()
        .map(|plugin| {
            let intent = BusinessIntent {
                initiative_type: plugin.initiative_type(),
                technology_role: TechnologyRole::OperationalTool,
                business_model: String::new(),
                primary_value_creation: String::new(),
                is_physical: false,
                is_digital: false,
                confidence: 1.0,
            };
            let pattern = plugin.analyze(&intent);
            PatternSummary {
                initiative_type: plugin.initiative_type().to_string(),
                name: plugin.name().to_string(),
                total_weight: pattern.weight_sum(),
                streams: pattern.streams,
            }
        })
        .collect()
}
