// Pipeline stages, in execution order
//
// Each stage owns its prompt builder and response schema and implements
// `PipelineStage`. The weighter is the only stage that makes no LLM call.

#[path = "01_analyze.rs"]
pub mod analyze;
#[path = "02_pattern.rs"]
pub mod pattern;
#[path = "03_weight.rs"]
pub mod weight;
#[path = "04_optimize.rs"]
pub mod optimize;
#[path = "05_validate.rs"]
pub mod validate;

pub use analyze::{AnalyzerInput, BusinessAnalyzer};
pub use optimize::{
    infer_basic_dependencies, OptimizerInput, StreamOptimizer, StreamProgressCallback,
};
pub use pattern::PatternProvider;
pub use validate::{SemanticValidator, ValidatorInput};
pub use weight::{adjust_pattern, AdaptivePatternWeighter, WeighterInput};
