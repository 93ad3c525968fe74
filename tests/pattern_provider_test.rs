//! Pattern resolution through the registry and the generated fallback

mod support;

use premisia_wbs::llm::{MockLLMClient, MockResponse};
use premisia_wbs::output::{
    BusinessIntent, InitiativeType, Priority, WorkStream, WorkStreamCategory, WorkStreamPattern,
};
use premisia_wbs::patterns::{PatternPlugin, PatternRegistry};
use premisia_wbs::pipeline::{PipelineError, WbsBuilder};
use serde_json::json;
use std::sync::Arc;
use support::*;

/// A launch plugin whose weights only reach 60%
struct UnderweightLaunch;

impl PatternPlugin for UnderweightLaunch {
    fn initiative_type(&self) -> InitiativeType {
        InitiativeType::BusinessLaunch
    }

    fn name(&self) -> &str {
        "Underweight Launch"
    }

    fn analyze(&self, _intent: &BusinessIntent) -> WorkStreamPattern {
        WorkStreamPattern {
            initiative_type: InitiativeType::BusinessLaunch,
            streams: vec![
                WorkStreamCategory::new("physical_infrastructure", 30.0, Priority::Critical),
                WorkStreamCategory::new("operations", 30.0, Priority::High),
            ],
            total_weight: Some(60.0),
        }
    }

    fn validate(&self, _workstreams: &[WorkStream]) -> bool {
        true
    }
}

fn generated_pattern(weights: [f64; 3]) -> MockResponse {
    MockResponse::json(json!({
        "streams": [
            {"category": "physical_infrastructure", "weight": weights[0], "priority": "critical"},
            {"category": "operations", "weight": weights[1], "priority": "high"},
            {"category": "marketing_sales", "weight": weights[2], "priority": "medium"}
        ]
    }))
}

fn underweight_registry() -> Arc<PatternRegistry> {
    let mut registry = PatternRegistry::new();
    registry.register(Arc::new(UnderweightLaunch));
    Arc::new(registry)
}

#[tokio::test]
async fn test_invalid_plugin_falls_back_to_generated_pattern() {
    let client = Arc::new(MockLLMClient::new());
    client.add_response(intent("business_launch", "operational_tool", 0.9));
    client.add_response(generated_pattern([45.0, 35.0, 18.0]));
    for name in ["Site Build-Out", "Daily Operations", "Launch Marketing"] {
        client.add_response(stream_with_three(name));
    }
    client.add_response(MockResponse::json(json!({"dependencies": []})));
    client.add_response(validation(true, 0.8));

    let wbs = WbsBuilder::new(client.clone())
        .with_registry(underweight_registry())
        .build_wbs(&insights(), &coffee_shop())
        .await
        .unwrap();

    assert_eq!(client.remaining_responses(), 0);
    assert_eq!(wbs.pattern.streams.len(), 3);
    assert_eq!(wbs.pattern.total_weight, Some(98.0));
    assert_ne!(wbs.pattern, UnderweightLaunch.analyze(&wbs.intent));
    assert_eq!(wbs.workstreams.len(), 3);
}

#[tokio::test]
async fn test_generated_pattern_out_of_tolerance_is_rejected() {
    let client = Arc::new(MockLLMClient::new());
    client.add_response(intent("business_launch", "operational_tool", 0.9));
    client.add_response(generated_pattern([20.0, 20.0, 20.0]));

    let err = WbsBuilder::new(client)
        .with_registry(underweight_registry())
        .build_wbs(&insights(), &coffee_shop())
        .await
        .unwrap_err();

    match err {
        PipelineError::InvalidPattern {
            initiative_type,
            total,
        } => {
            assert_eq!(initiative_type, InitiativeType::BusinessLaunch);
            assert_eq!(total, 60.0);
        }
        other => panic!("Expected InvalidPattern, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unregistered_initiative_generates_pattern() {
    let client = Arc::new(MockLLMClient::new());
    client.add_response(intent("market_expansion", "minimal", 0.7));
    client.add_response(generated_pattern([40.0, 40.0, 20.0]));

    let registry = PatternRegistry::with_defaults();
    assert!(!registry.has_pattern(InitiativeType::MarketExpansion));

    for name in ["Second Site", "Regional Operations", "Local Marketing"] {
        client.add_response(stream_with_three(name));
    }
    client.add_response(MockResponse::json(json!({"dependencies": []})));
    client.add_response(validation(true, 0.75));

    let wbs = WbsBuilder::new(client)
        .with_registry(Arc::new(registry))
        .build_wbs(&insights(), &coffee_shop())
        .await
        .unwrap();

    assert_eq!(wbs.pattern.initiative_type, InitiativeType::MarketExpansion);
    assert_eq!(wbs.pattern.total_weight, Some(100.0));
}
