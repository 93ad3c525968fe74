//! Work stream patterns
//!
//! A pattern is a weighted set of workstream categories appropriate for one
//! initiative type. Hand-authored patterns are registered as
//! [`PatternPlugin`]s in a [`PatternRegistry`]; initiative types without a
//! plugin get an LLM-generated pattern from the pattern stage.

mod business_launch;
pub mod categories;
mod registry;
mod software_development;

pub use business_launch::BusinessLaunchPattern;
pub use registry::PatternRegistry;
pub use software_development::SoftwareDevelopmentPattern;

use crate::output::{BusinessIntent, InitiativeType, WorkStream, WorkStreamPattern};

/// Allowed deviation, in percentage points, of a pattern's weight sum from 100
pub const WEIGHT_TOLERANCE: f64 = 5.0;

pub trait PatternPlugin: Send + Sync {
    fn initiative_type(&self) -> InitiativeType;

    fn name(&self) -> &str;

    /// Builds the intent-specific pattern. Weights are percentages.
    fn analyze(&self, intent: &BusinessIntent) -> WorkStreamPattern;

    /// Checks that generated workstreams still reflect what this pattern
    /// requires.
    fn validate(&self, workstreams: &[WorkStream]) -> bool;
}

/// `|sum(weights) - 100| <= WEIGHT_TOLERANCE`
pub fn validate_pattern_weights(pattern: &WorkStreamPattern) -> bool {
    (pattern.weight_sum() - 100.0).abs() <= WEIGHT_TOLERANCE
}

/// True when every category in `required` has at least one workstream
pub(crate) fn covers_categories(workstreams: &[WorkStream], required: &[&str]) -> bool {
    required
        .iter()
        .all(|cat| workstreams.iter().any(|ws| ws.category == *cat))
}
