//! Shared fixtures for scripting full pipeline runs against the mock client

#![allow(dead_code)]

use premisia_wbs::llm::{MockLLMClient, MockResponse};
use premisia_wbs::output::{BusinessContext, BusinessScale, PlanningContext};
use serde_json::{json, Value};

pub fn coffee_shop() -> PlanningContext {
    PlanningContext::new(BusinessContext {
        name: "Bean There".to_string(),
        business_type: "coffee shop".to_string(),
        industry: Some("food & beverage".to_string()),
        scale: BusinessScale::Smb,
        description: "Specialty coffee shop near the university campus".to_string(),
        keywords: Some(vec!["coffee".to_string(), "campus".to_string()]),
    })
}

pub fn saas_startup() -> PlanningContext {
    PlanningContext::new(BusinessContext {
        name: "Ledgerly".to_string(),
        business_type: "b2b saas".to_string(),
        industry: Some("fintech".to_string()),
        scale: BusinessScale::MidMarket,
        description: "Invoice automation for small accounting firms".to_string(),
        keywords: None,
    })
    .with_objective("Reach 100 paying firms within a year")
}

pub fn insights() -> Value {
    json!({
        "swot": {
            "strengths": ["Experienced barista team"],
            "weaknesses": ["No existing brand"],
            "opportunities": ["Few specialty cafes near campus"],
            "threats": ["Chain competitor opening nearby"]
        }
    })
}

pub fn intent(initiative_type: &str, technology_role: &str, confidence: f64) -> MockResponse {
    MockResponse::json(json!({
        "initiativeType": initiative_type,
        "technologyRole": technology_role,
        "businessModel": "retail",
        "primaryValueCreation": "in-person experience",
        "isPhysical": technology_role != "core_product",
        "isDigital": technology_role == "core_product",
        "confidence": confidence
    }))
}

pub fn stream(name: &str, deliverables: &[&str]) -> MockResponse {
    MockResponse::json(json!({
        "name": name,
        "description": format!("{} workstream", name),
        "deliverables": deliverables
    }))
}

pub fn stream_with_three(name: &str) -> MockResponse {
    let plan = format!("{} plan", name);
    let budget = format!("{} budget", name);
    let sign_off = format!("{} sign-off", name);
    stream(name, &[plan.as_str(), budget.as_str(), sign_off.as_str()])
}

pub fn validation(is_valid: bool, coherence: f64) -> MockResponse {
    MockResponse::json(json!({
        "isValid": is_valid,
        "coherenceScore": coherence,
        "issues": [],
        "warnings": [],
        "suggestions": []
    }))
}

/// Scripts every stream of the business launch pattern, in pattern order
pub fn business_launch_streams(client: &MockLLMClient) {
    for name in [
        "Site Build-Out",
        "Point of Sale",
        "Daily Operations",
        "Staffing",
        "Launch Marketing",
        "Permits and Licensing",
    ] {
        client.add_response(stream_with_three(name));
    }
}
