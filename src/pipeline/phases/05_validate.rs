use crate::llm::generate_structured;
use crate::output::{PlanningContext, ValidationResult, WorkStream};
use crate::pipeline::context::PipelineContext;
use crate::pipeline::error::PipelineError;
use crate::pipeline::phase_trait::PipelineStage;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{info, warn};

const STAGE: &str = "validator";

#[derive(Debug, Clone)]
pub struct ValidatorInput {
    pub objective: String,
    pub context: PlanningContext,
    pub workstreams: Vec<WorkStream>,
}

/// Scores generated workstreams against the business objective.
///
/// The model's judgment is returned as-is: `is_valid` is not reconciled with
/// critical-severity issues, a disagreement is only logged.
pub struct SemanticValidator {
    context: PipelineContext,
}

impl SemanticValidator {
    pub fn new(context: PipelineContext) -> Self {
        Self { context }
    }
}

fn validation_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "isValid": {"type": "boolean"},
            "coherenceScore": {"type": "number", "minimum": 0, "maximum": 1},
            "issues": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "severity": {"type": "string", "enum": ["critical", "warning", "info"]},
                        "message": {"type": "string"},
                        "affectedStreams": {"type": "array", "items": {"type": "string"}}
                    },
                    "required": ["severity", "message", "affectedStreams"]
                }
            },
            "warnings": {"type": "array", "items": {"type": "string"}},
            "suggestions": {"type": "array", "items": {"type": "string"}}
        },
        "required": ["isValid", "coherenceScore", "issues", "warnings", "suggestions"]
    })
}

fn build_prompt(input: &ValidatorInput) -> String {
    let business = &input.context.business;
    let workstreams =
        serde_json::to_string_pretty(&input.workstreams).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"Review this work breakdown structure for coherence with the business objective.

Objective: {objective}

Business:
- Name: {name}
- Type: {kind}
- Industry: {industry}
- Scale: {scale}

Workstreams:
{workstreams}

Assess:
- Does the set of workstreams cover what the objective requires? Name anything missing.
- Are the workstreams specific to this business rather than generic?
- Do effort shares and dependencies make sense?

coherenceScore is between 0 and 1. Each issue names the ids of the workstreams it affects.
"#,
        objective = input.objective,
        name = business.name,
        kind = business.business_type,
        industry = business.industry_or_type(),
        scale = business.scale.as_str(),
        workstreams = workstreams,
    )
}

#[async_trait]
impl PipelineStage for SemanticValidator {
    type Input = ValidatorInput;
    type Output = ValidationResult;

    fn name(&self) -> &'static str {
        STAGE
    }

    async fn process(&self, input: &ValidatorInput) -> Result<ValidationResult, PipelineError> {
        let request = self
            .context
            .structured_request(STAGE, build_prompt(input), validation_schema());

        let result: ValidationResult = generate_structured(
            self.context.llm_client.as_ref(),
            request,
            &self.context.heuristic_logger,
        )
        .await
        .map_err(PipelineError::llm(STAGE))?;

        if result.is_valid && result.has_critical_issues() {
            warn!(
                critical = result.critical_issues().count(),
                "Validator marked WBS valid despite critical issues"
            );
        }

        info!(
            stage = STAGE,
            is_valid = result.is_valid,
            coherence = result.coherence_score,
            issues = result.issues.len(),
            "Workstreams validated"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{BackendError, MockLLMClient, MockResponse};
    use crate::output::{BusinessContext, BusinessScale, Priority, Severity};
    use std::sync::Arc;

    fn input() -> ValidatorInput {
        let context = PlanningContext::new(BusinessContext {
            name: "Ledgerly".to_string(),
            business_type: "b2b saas".to_string(),
            industry: None,
            scale: BusinessScale::MidMarket,
            description: "Invoice automation for accountants".to_string(),
            keywords: None,
        });

        ValidatorInput {
            objective: context.objective().to_string(),
            context,
            workstreams: vec![WorkStream {
                id: "WS001".to_string(),
                name: "Core Platform Build".to_string(),
                category: "technology_systems".to_string(),
                description: "Build the invoicing engine".to_string(),
                proportional_effort: 60.0,
                priority: Priority::Critical,
                deliverables: vec!["API".to_string(), "UI".to_string(), "OCR".to_string()],
                dependencies: vec![],
                confidence: 0.98,
            }],
        }
    }

    #[tokio::test]
    async fn test_result_is_taken_as_is() {
        let client = Arc::new(MockLLMClient::new());
        client.add_response(MockResponse::json(json!({
            "isValid": true,
            "coherenceScore": 0.72,
            "issues": [
                {"severity": "critical", "message": "No compliance workstream", "affectedStreams": []}
            ],
            "warnings": ["Marketing is thin"],
            "suggestions": []
        })));

        let result = SemanticValidator::new(PipelineContext::new(client.clone()))
            .process(&input())
            .await
            .unwrap();

        assert!(result.is_valid);
        assert!(result.has_critical_issues());
        assert_eq!(result.issues[0].severity, Severity::Critical);
        assert_eq!(result.coherence_score, 0.72);

        let prompt = client.calls()[0].request.user_content();
        assert!(prompt.contains("Invoice automation for accountants"));
        assert!(prompt.contains("Core Platform Build"));
        assert!(prompt.contains("Industry: b2b saas"));
    }

    #[tokio::test]
    async fn test_llm_failure_propagates() {
        let client = Arc::new(MockLLMClient::new());
        client.add_response(MockResponse::error(BackendError::RateLimitError {
            retry_after: None,
        }));

        let err = SemanticValidator::new(PipelineContext::new(client))
            .process(&input())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Llm { stage: "validator", .. }));
    }
}
