use super::categories::{
    HUMAN_RESOURCES, LEGAL_COMPLIANCE, MARKETING_SALES, OPERATIONS, TECHNOLOGY_SYSTEMS,
};
use super::{covers_categories, PatternPlugin};
use crate::output::{
    BusinessIntent, InitiativeType, Priority, WorkStream, WorkStreamCategory, WorkStreamPattern,
};

pub struct SoftwareDevelopmentPattern;

impl PatternPlugin for SoftwareDevelopmentPattern {
    fn initiative_type(&self) -> InitiativeType {
        InitiativeType::SoftwareDevelopment
    }

    fn name(&self) -> &str {
        "Software Development"
    }

    fn analyze(&self, _intent: &BusinessIntent) -> WorkStreamPattern {
        WorkStreamPattern {
            initiative_type: InitiativeType::SoftwareDevelopment,
            streams: vec![
                WorkStreamCategory::new(TECHNOLOGY_SYSTEMS, 60.0, Priority::Critical)
                    .with_description("Architecture, product engineering, QA and infrastructure"),
                WorkStreamCategory::new(OPERATIONS, 10.0, Priority::Medium)
                    .with_description("Support, release management and SLAs"),
                WorkStreamCategory::new(HUMAN_RESOURCES, 15.0, Priority::High)
                    .with_description("Engineering hiring and onboarding"),
                WorkStreamCategory::new(MARKETING_SALES, 10.0, Priority::Medium)
                    .with_description("Go-to-market, pricing and onboarding funnels"),
                WorkStreamCategory::new(LEGAL_COMPLIANCE, 5.0, Priority::Low)
                    .with_description("Terms of service, privacy and data protection"),
            ],
            total_weight: Some(100.0),
        }
    }

    fn validate(&self, workstreams: &[WorkStream]) -> bool {
        covers_categories(workstreams, &[TECHNOLOGY_SYSTEMS])
    }
}
