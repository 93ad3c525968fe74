//! WBS generation pipeline
//!
//! Stages run strictly in sequence, each awaiting its LLM call before the
//! next begins. Two failures are recovered locally: plugin patterns with bad
//! weights fall back to a generated pattern, and a failed dependency-linking
//! call falls back to a sequential chain. Everything else propagates.

pub mod confidence;
pub mod config;
pub mod context;
pub mod error;
pub mod orchestrator;
pub mod phase_trait;
pub mod phases;
pub mod strategy;

pub use confidence::{compose_confidence, stream_confidence};
pub use config::PipelineConfig;
pub use context::PipelineContext;
pub use error::PipelineError;
pub use orchestrator::WbsBuilder;
pub use phase_trait::PipelineStage;
pub use phases::{
    adjust_pattern, infer_basic_dependencies, AdaptivePatternWeighter, AnalyzerInput,
    BusinessAnalyzer, OptimizerInput, PatternProvider, SemanticValidator, StreamOptimizer,
    StreamProgressCallback, ValidatorInput, WeighterInput,
};
pub use strategy::{resolve_profile, StaticStrategyProfiler, StrategyProfiler};
