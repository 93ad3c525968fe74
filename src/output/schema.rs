//! Data model shared by every pipeline stage and by callers of the builder.
//!
//! All types serialize with camelCase keys, the shape the planning front end
//! and the LLM prompts both speak.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

/// What kind of initiative the business is undertaking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitiativeType {
    BusinessLaunch,
    SoftwareDevelopment,
    DigitalTransformation,
    MarketExpansion,
    ProductLaunch,
    General,
}

impl InitiativeType {
    pub fn all_variants() -> &'static [Self] {
        &[
            Self::BusinessLaunch,
            Self::SoftwareDevelopment,
            Self::DigitalTransformation,
            Self::MarketExpansion,
            Self::ProductLaunch,
            Self::General,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BusinessLaunch => "business_launch",
            Self::SoftwareDevelopment => "software_development",
            Self::DigitalTransformation => "digital_transformation",
            Self::MarketExpansion => "market_expansion",
            Self::ProductLaunch => "product_launch",
            Self::General => "general",
        }
    }
}

impl fmt::Display for InitiativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The part technology plays in the initiative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechnologyRole {
    CoreProduct,
    OperationalTool,
    Minimal,
}

impl TechnologyRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CoreProduct => "core_product",
            Self::OperationalTool => "operational_tool",
            Self::Minimal => "minimal",
        }
    }
}

/// Classified nature of an initiative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessIntent {
    pub initiative_type: InitiativeType,
    pub technology_role: TechnologyRole,
    pub business_model: String,
    pub primary_value_creation: String,
    pub is_physical: bool,
    pub is_digital: bool,
    /// Model-reported confidence in `[0, 1]`
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// One weighted category of a pattern. `weight` is a percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkStreamCategory {
    pub category: String,
    pub weight: f64,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl WorkStreamCategory {
    pub fn new(category: impl Into<String>, weight: f64, priority: Priority) -> Self {
        Self {
            category: category.into(),
            weight,
            priority,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkStreamPattern {
    pub initiative_type: InitiativeType,
    pub streams: Vec<WorkStreamCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_weight: Option<f64>,
}

impl WorkStreamPattern {
    pub fn weight_sum(&self) -> f64 {
        self.streams.iter().map(|s| s.weight).sum()
    }

    pub fn find(&self, category: &str) -> Option<&WorkStreamCategory> {
        self.streams.iter().find(|s| s.category == category)
    }
}

/// A concrete workstream produced by the optimizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkStream {
    /// `WS` followed by a zero-padded 3-digit index
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: String,
    pub proportional_effort: f64,
    pub priority: Priority,
    pub deliverables: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub dependencies: Vec<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub severity: Severity,
    pub message: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub affected_streams: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub coherence_score: f64,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub issues: Vec<ValidationIssue>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub warnings: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub suggestions: Vec<String>,
}

impl ValidationResult {
    pub fn critical_issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Critical)
    }

    pub fn has_critical_issues(&self) -> bool {
        self.critical_issues().next().is_some()
    }
}

/// Final work breakdown structure handed back to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wbs {
    pub intent: BusinessIntent,
    pub pattern: WorkStreamPattern,
    pub workstreams: Vec<WorkStream>,
    pub confidence: f64,
    pub validation_report: ValidationResult,
}

/// Upstream strategic signal that can override the default pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyProfile {
    /// `"traditional"` leaves the base pattern untouched
    pub archetype: String,
    /// Percentage of the value proposition delivered digitally
    #[serde(default)]
    pub digital_intensity: f64,
    #[serde(default)]
    pub needs_platform: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology_role_override: Option<TechnologyRole>,
    /// Target weight per category
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub effort_adjustments: BTreeMap<String, f64>,
}

impl StrategyProfile {
    pub const TRADITIONAL: &'static str = "traditional";

    pub fn is_traditional(&self) -> bool {
        self.archetype.eq_ignore_ascii_case(Self::TRADITIONAL)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessScale {
    Smb,
    MidMarket,
    Enterprise,
}

impl BusinessScale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Smb => "smb",
            Self::MidMarket => "mid_market",
            Self::Enterprise => "enterprise",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessContext {
    pub name: String,
    /// Free-form type hint, e.g. "coffee shop" or "b2b saas"
    #[serde(rename = "type")]
    pub business_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    pub scale: BusinessScale,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
}

impl BusinessContext {
    /// Industry if known, otherwise the type hint
    pub fn industry_or_type(&self) -> &str {
        self.industry.as_deref().unwrap_or(&self.business_type)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningContext {
    pub business: BusinessContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
}

impl PlanningContext {
    pub fn new(business: BusinessContext) -> Self {
        Self {
            business,
            objective: None,
        }
    }

    pub fn with_objective(mut self, objective: impl Into<String>) -> Self {
        self.objective = Some(objective.into());
        self
    }

    /// Objective the validator scores against: explicit objective, else the
    /// business description.
    pub fn objective(&self) -> &str {
        self.objective
            .as_deref()
            .unwrap_or(&self.business.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_intent_uses_camel_case_and_snake_enums() {
        let intent = BusinessIntent {
            initiative_type: InitiativeType::BusinessLaunch,
            technology_role: TechnologyRole::OperationalTool,
            business_model: "retail".to_string(),
            primary_value_creation: "in-store experience".to_string(),
            is_physical: true,
            is_digital: false,
            confidence: 0.8,
        };

        let value = serde_json::to_value(&intent).unwrap();
        assert_eq!(value["initiativeType"], "business_launch");
        assert_eq!(value["technologyRole"], "operational_tool");
        assert_eq!(value["isPhysical"], true);
    }

    #[test]
    fn test_unknown_initiative_type_is_rejected() {
        let result: Result<InitiativeType, _> = serde_json::from_value(json!("space_program"));
        assert!(result.is_err());
    }

    #[test]
    fn test_business_context_type_field() {
        let ctx: BusinessContext = serde_json::from_value(json!({
            "name": "Bean There",
            "type": "coffee shop",
            "scale": "smb",
            "description": "Neighbourhood specialty coffee"
        }))
        .unwrap();

        assert_eq!(ctx.business_type, "coffee shop");
        assert_eq!(ctx.scale, BusinessScale::Smb);
        assert_eq!(ctx.industry_or_type(), "coffee shop");
    }

    #[test]
    fn test_objective_falls_back_to_description() {
        let ctx = PlanningContext::new(BusinessContext {
            name: "Acme".to_string(),
            business_type: "saas".to_string(),
            industry: Some("software".to_string()),
            scale: BusinessScale::MidMarket,
            description: "Invoice automation".to_string(),
            keywords: None,
        });
        assert_eq!(ctx.objective(), "Invoice automation");

        let ctx = ctx.with_objective("Reach 100 paying customers");
        assert_eq!(ctx.objective(), "Reach 100 paying customers");
    }

    #[test]
    fn test_validation_result_null_lists() {
        let result: ValidationResult = serde_json::from_value(json!({
            "isValid": true,
            "coherenceScore": 0.9,
            "issues": null,
            "warnings": null
        }))
        .unwrap();

        assert!(result.issues.is_empty());
        assert!(result.suggestions.is_empty());
        assert!(!result.has_critical_issues());
    }

    #[test]
    fn test_strategy_profile_traditional() {
        let profile: StrategyProfile =
            serde_json::from_value(json!({"archetype": "Traditional"})).unwrap();
        assert!(profile.is_traditional());
        assert!(profile.effort_adjustments.is_empty());
    }
}
