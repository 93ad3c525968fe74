use super::categories::{
    HUMAN_RESOURCES, LEGAL_COMPLIANCE, MARKETING_SALES, OPERATIONS, PHYSICAL_INFRASTRUCTURE,
    TECHNOLOGY_SYSTEMS,
};
use super::{covers_categories, PatternPlugin};
use crate::output::{
    BusinessIntent, InitiativeType, Priority, TechnologyRole, WorkStream, WorkStreamCategory,
    WorkStreamPattern,
};

/// Launching a new (typically physical) business
pub struct BusinessLaunchPattern;

impl PatternPlugin for BusinessLaunchPattern {
    fn initiative_type(&self) -> InitiativeType {
        InitiativeType::BusinessLaunch
    }

    fn name(&self) -> &str {
        "Business Launch"
    }

    fn analyze(&self, intent: &BusinessIntent) -> WorkStreamPattern {
        let technology_description = match intent.technology_role {
            TechnologyRole::CoreProduct => "Build the digital product the business sells",
            _ => "Point of sale, booking and back-office systems",
        };

        WorkStreamPattern {
            initiative_type: InitiativeType::BusinessLaunch,
            streams: vec![
                WorkStreamCategory::new(PHYSICAL_INFRASTRUCTURE, 35.0, Priority::Critical)
                    .with_description("Location, build-out, equipment and fixtures"),
                WorkStreamCategory::new(TECHNOLOGY_SYSTEMS, 10.0, Priority::Medium)
                    .with_description(technology_description),
                WorkStreamCategory::new(OPERATIONS, 25.0, Priority::Critical)
                    .with_description("Processes, suppliers and day-to-day running"),
                WorkStreamCategory::new(HUMAN_RESOURCES, 15.0, Priority::High)
                    .with_description("Hiring, training and scheduling staff"),
                WorkStreamCategory::new(MARKETING_SALES, 10.0, Priority::High)
                    .with_description("Brand, pre-launch buzz and customer acquisition"),
                WorkStreamCategory::new(LEGAL_COMPLIANCE, 5.0, Priority::High)
                    .with_description("Permits, licenses, insurance and entity setup"),
            ],
            total_weight: Some(100.0),
        }
    }

    fn validate(&self, workstreams: &[WorkStream]) -> bool {
        covers_categories(workstreams, &[PHYSICAL_INFRASTRUCTURE, OPERATIONS])
    }
}
