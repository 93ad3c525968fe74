//! premisia-wbs - LLM-driven work breakdown structures for business initiatives
//!
//! Turns free-form strategic insights plus a short business description into a
//! validated set of workstreams with effort weights, deliverables,
//! dependencies and a composite confidence score.
//!
//! # Core Concepts
//!
//! - **Intent**: what kind of initiative the business is undertaking, inferred
//!   by the analyzer stage
//! - **Pattern**: the weighted workstream categories for that initiative, taken
//!   from a registered plugin or generated on demand
//! - **Strategy profile**: optional upstream signal that reweights the pattern
//! - **WBS**: the final workstreams plus the validator's coherence report
//!
//! # Example Usage
//!
//! ```ignore
//! use premisia_wbs::{select_llm_client, PlanningContext, WbsBuilder, WbsConfig};
//!
//! async fn plan(context: PlanningContext, insights: serde_json::Value) -> anyhow::Result<()> {
//!     let config = WbsConfig::from_env()?;
//!     let selected = select_llm_client(&config).await?;
//!
//!     let wbs = WbsBuilder::new(selected.client)
//!         .with_config(config.pipeline_config())
//!         .build_wbs(&insights, &context)
//!         .await?;
//!
//!     for ws in &wbs.workstreams {
//!         println!("{} {} ({:.0}%)", ws.id, ws.name, ws.proportional_effort);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Project Structure
//!
//! - [`pipeline`]: the staged builder and its phases
//! - [`patterns`]: workstream pattern plugins and their registry
//! - [`llm`]: provider-agnostic client and schema-constrained generation
//! - [`output`]: the serialized data model

pub mod cli;
pub mod config;
pub mod heuristics;
pub mod llm;
pub mod output;
pub mod patterns;
pub mod pipeline;
pub mod progress;
pub mod util;

pub use config::{ConfigError, WbsConfig};
pub use llm::{select_llm_client, BackendError, GenAIClient, LLMClient, MockLLMClient};
pub use output::{
    BusinessContext, BusinessIntent, BusinessScale, InitiativeType, PlanningContext,
    StrategyProfile, ValidationResult, Wbs, WorkStream, WorkStreamPattern,
};
pub use patterns::{PatternPlugin, PatternRegistry};
pub use pipeline::{PipelineConfig, PipelineError, StrategyProfiler, WbsBuilder};
pub use progress::{LoggingHandler, NoOpHandler, ProgressEvent, ProgressHandler};
pub use util::{init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "premisia-wbs");
    }
}
