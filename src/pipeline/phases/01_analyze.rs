use crate::llm::generate_structured;
use crate::output::{BusinessIntent, InitiativeType, PlanningContext, StrategyProfile};
use crate::pipeline::context::PipelineContext;
use crate::pipeline::error::PipelineError;
use crate::pipeline::phase_trait::PipelineStage;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info};

const STAGE: &str = "analyzer";

#[derive(Debug, Clone)]
pub struct AnalyzerInput {
    /// Raw business-analysis payload; strings are embedded verbatim, anything
    /// else as pretty-printed JSON
    pub insights: Value,
    pub context: PlanningContext,
    pub strategy_profile: Option<StrategyProfile>,
}

/// Classifies the initiative into a [`BusinessIntent`]
pub struct BusinessAnalyzer {
    context: PipelineContext,
}

impl BusinessAnalyzer {
    pub fn new(context: PipelineContext) -> Self {
        Self { context }
    }
}

pub(crate) fn render_insights(insights: &Value) -> String {
    match insights {
        Value::String(text) => text.clone(),
        Value::Null => "(no insights provided)".to_string(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

fn intent_schema() -> Value {
    let initiative_types: Vec<&str> = InitiativeType::all_variants()
        .iter()
        .map(|t| t.as_str())
        .collect();

    json!({
        "type": "object",
        "properties": {
            "initiativeType": {"type": "string", "enum": initiative_types},
            "technologyRole": {
                "type": "string",
                "enum": ["core_product", "operational_tool", "minimal"]
            },
            "businessModel": {"type": "string"},
            "primaryValueCreation": {"type": "string"},
            "isPhysical": {"type": "boolean"},
            "isDigital": {"type": "boolean"},
            "confidence": {"type": "number", "minimum": 0, "maximum": 1}
        },
        "required": [
            "initiativeType", "technologyRole", "businessModel",
            "primaryValueCreation", "isPhysical", "isDigital", "confidence"
        ]
    })
}

fn strategy_hints(profile: Option<&StrategyProfile>) -> String {
    match profile {
        Some(profile) if !profile.is_traditional() => format!(
            "\nStrategic signals:\n- Archetype: {}\n- Digital intensity: {:.0}% of the value proposition\n- Needs a platform: {}\n",
            profile.archetype,
            profile.digital_intensity,
            if profile.needs_platform { "yes" } else { "no" }
        ),
        _ => String::new(),
    }
}

fn build_prompt(input: &AnalyzerInput) -> String {
    let business = &input.context.business;
    let keywords = business
        .keywords
        .as_ref()
        .filter(|k| !k.is_empty())
        .map(|k| format!("- Keywords: {}\n", k.join(", ")))
        .unwrap_or_default();

    format!(
        r#"Classify the business initiative described below.

Business:
- Name: {name}
- Type: {kind}
- Industry: {industry}
- Scale: {scale}
- Description: {description}
{keywords}{hints}
Business analysis insights:
{insights}

Classification rules:
- initiativeType: what is being undertaken. A coffee shop opening is "business_launch" even if it has an app.
- technologyRole: "core_product" when software IS what the business sells, "operational_tool" when software supports
  a non-software business, "minimal" when technology is incidental.
- isPhysical / isDigital: whether value is delivered in physical spaces and/or digitally. Both may be true.
- confidence: how certain you are about initiativeType, between 0 and 1.
"#,
        name = business.name,
        kind = business.business_type,
        industry = business.industry.as_deref().unwrap_or("unspecified"),
        scale = business.scale.as_str(),
        description = business.description,
        keywords = keywords,
        hints = strategy_hints(input.strategy_profile.as_ref()),
        insights = render_insights(&input.insights),
    )
}

#[async_trait]
impl PipelineStage for BusinessAnalyzer {
    type Input = AnalyzerInput;
    type Output = BusinessIntent;

    fn name(&self) -> &'static str {
        STAGE
    }

    async fn process(&self, input: &AnalyzerInput) -> Result<BusinessIntent, PipelineError> {
        let request = self
            .context
            .structured_request(STAGE, build_prompt(input), intent_schema());

        let mut intent: BusinessIntent = generate_structured(
            self.context.llm_client.as_ref(),
            request,
            &self.context.heuristic_logger,
        )
        .await
        .map_err(PipelineError::llm(STAGE))?;

        if let Some(role) = input
            .strategy_profile
            .as_ref()
            .and_then(|p| p.technology_role_override)
        {
            if role != intent.technology_role {
                debug!(
                    inferred = intent.technology_role.as_str(),
                    override_role = role.as_str(),
                    "Strategy profile overrides technology role"
                );
            }
            intent.technology_role = role;
        }

        info!(
            stage = STAGE,
            initiative_type = %intent.initiative_type,
            technology_role = intent.technology_role.as_str(),
            confidence = intent.confidence,
            "Business intent classified"
        );

        Ok(intent)
    }
}
