use crate::llm::generate_structured;
use crate::output::{BusinessIntent, WorkStreamCategory, WorkStreamPattern};
use crate::patterns::categories::{is_known, VOCABULARY};
use crate::patterns::{validate_pattern_weights, PatternRegistry};
use crate::pipeline::context::PipelineContext;
use crate::pipeline::error::PipelineError;
use crate::pipeline::phase_trait::PipelineStage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

const STAGE: &str = "pattern";

#[derive(Debug, Serialize, Deserialize)]
struct GeneratedPattern {
    streams: Vec<WorkStreamCategory>,
}

/// Resolves the workstream pattern for an intent: a registered plugin when
/// one exists and its weights hold, an LLM-generated pattern otherwise.
pub struct PatternProvider {
    context: PipelineContext,
    registry: Arc<PatternRegistry>,
}

impl PatternProvider {
    pub fn new(context: PipelineContext, registry: Arc<PatternRegistry>) -> Self {
        Self { context, registry }
    }

    fn from_plugin(&self, intent: &BusinessIntent) -> Option<WorkStreamPattern> {
        let Some(plugin) = self.registry.get_pattern(intent.initiative_type) else {
            debug!(initiative_type = %intent.initiative_type, "No pattern plugin registered");
            return None;
        };

        let pattern = plugin.analyze(intent);
        if validate_pattern_weights(&pattern) {
            info!(
                stage = STAGE,
                plugin = plugin.name(),
                streams = pattern.streams.len(),
                "Using registered pattern"
            );
            return Some(pattern);
        }

        warn!(
            plugin = plugin.name(),
            total = pattern.weight_sum(),
            "Plugin pattern weights outside tolerance, generating pattern instead"
        );
        None
    }

    async fn generate(&self, intent: &BusinessIntent) -> Result<WorkStreamPattern, PipelineError> {
        let request = self
            .context
            .structured_request(STAGE, build_prompt(intent), pattern_schema());

        let generated: GeneratedPattern = generate_structured(
            self.context.llm_client.as_ref(),
            request,
            &self.context.heuristic_logger,
        )
        .await
        .map_err(PipelineError::llm(STAGE))?;

        if generated.streams.is_empty() {
            return Err(PipelineError::InvalidOutput {
                stage: STAGE,
                message: "generated pattern has no streams".to_string(),
            });
        }

        for stream in generated.streams.iter().filter(|s| !is_known(&s.category)) {
            warn!(
                category = %stream.category,
                "Generated pattern uses a category outside the vocabulary"
            );
        }

        let total = generated.streams.iter().map(|s| s.weight).sum::<f64>();
        let pattern = WorkStreamPattern {
            initiative_type: intent.initiative_type,
            streams: generated.streams,
            total_weight: Some(total),
        };

        if !validate_pattern_weights(&pattern) {
            return Err(PipelineError::InvalidPattern {
                initiative_type: intent.initiative_type,
                total,
            });
        }

        info!(
            stage = STAGE,
            streams = pattern.streams.len(),
            total,
            "Generated pattern"
        );
        Ok(pattern)
    }
}

fn pattern_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "streams": {
                "type": "array",
                "minItems": 3,
                "items": {
                    "type": "object",
                    "properties": {
                        "category": {"type": "string", "enum": VOCABULARY},
                        "weight": {"type": "number", "minimum": 0, "maximum": 100},
                        "priority": {
                            "type": "string",
                            "enum": ["critical", "high", "medium", "low"]
                        },
                        "description": {"type": "string"}
                    },
                    "required": ["category", "weight", "priority"]
                }
            }
        },
        "required": ["streams"]
    })
}

fn build_prompt(intent: &BusinessIntent) -> String {
    format!(
        r#"Design the workstream pattern for this initiative.

Initiative:
- Type: {initiative_type}
- Technology role: {technology_role}
- Business model: {business_model}
- Primary value creation: {value}
- Physical presence: {physical}
- Digital delivery: {digital}

Rules:
- Use only these categories, each at most once: {vocabulary}
- Include only the categories this initiative actually needs.
- weight is the percentage of total effort; weights MUST sum to 100.
- priority reflects how critical the category is to launching successfully.
"#,
        initiative_type = intent.initiative_type,
        technology_role = intent.technology_role.as_str(),
        business_model = intent.business_model,
        value = intent.primary_value_creation,
        physical = intent.is_physical,
        digital = intent.is_digital,
        vocabulary = VOCABULARY.join(", "),
    )
}

#[async_trait]
impl PipelineStage for PatternProvider {
    type Input = BusinessIntent;
    type Output = WorkStreamPattern;

    fn name(&self) -> &'static str {
        STAGE
    }

    async fn process(&self, intent: &BusinessIntent) -> Result<WorkStreamPattern, PipelineError> {
        match self.from_plugin(intent) {
            Some(pattern) => Ok(pattern),
            None => self.generate(intent).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{MockLLMClient, MockResponse};
    use crate::output::{InitiativeType, Priority, TechnologyRole};

    fn intent(initiative_type: InitiativeType) -> BusinessIntent {
        BusinessIntent {
            initiative_type,
            technology_role: TechnologyRole::OperationalTool,
            business_model: "retail".to_string(),
            primary_value_creation: "regional distribution".to_string(),
            is_physical: true,
            is_digital: false,
            confidence: 0.8,
        }
    }

    fn provider(client: Arc<MockLLMClient>) -> PatternProvider {
        PatternProvider::new(
            PipelineContext::new(client),
            Arc::new(PatternRegistry::with_defaults()),
        )
    }

    fn generated(weights: &[(&str, f64)]) -> Value {
        let streams: Vec<Value> = weights
            .iter()
            .map(|(c, w)| json!({"category": c, "weight": w, "priority": "high"}))
            .collect();
        json!({ "streams": streams })
    }

    #[tokio::test]
    async fn test_registered_plugin_skips_llm() {
        let client = Arc::new(MockLLMClient::new());
        let pattern = provider(client.clone())
            .process(&intent(InitiativeType::BusinessLaunch))
            .await
            .unwrap();

        assert_eq!(pattern.streams.len(), 6);
        assert_eq!(pattern.total_weight, Some(100.0));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unregistered_type_generates_pattern() {
        let client = Arc::new(MockLLMClient::new());
        client.add_response(MockResponse::json(generated(&[
            ("operations", 30.0),
            ("marketing_sales", 40.0),
            ("supply_chain", 28.0),
        ])));

        let pattern = provider(client.clone())
            .process(&intent(InitiativeType::MarketExpansion))
            .await
            .unwrap();

        assert_eq!(pattern.initiative_type, InitiativeType::MarketExpansion);
        assert_eq!(pattern.streams.len(), 3);
        assert_eq!(pattern.total_weight, Some(98.0));
        assert_eq!(pattern.streams[1].priority, Priority::High);

        let prompt = client.calls()[0].request.user_content();
        assert!(prompt.contains("financial_management"));
        assert!(prompt.contains("market_expansion"));
    }

    #[tokio::test]
    async fn test_generated_pattern_out_of_tolerance_is_rejected() {
        let client = Arc::new(MockLLMClient::new());
        client.add_response(MockResponse::json(generated(&[
            ("operations", 30.0),
            ("marketing_sales", 30.0),
        ])));

        let err = provider(client)
            .process(&intent(InitiativeType::General))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::InvalidPattern { total, .. } if total == 60.0
        ));
    }

    #[tokio::test]
    async fn test_generated_pattern_without_streams_is_rejected() {
        let client = Arc::new(MockLLMClient::new());
        client.add_response(MockResponse::json(json!({"streams": []})));

        let err = provider(client)
            .process(&intent(InitiativeType::ProductLaunch))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::InvalidOutput { stage: "pattern", .. }));
    }
}
