pub mod schema;

pub use schema::{
    BusinessContext, BusinessIntent, BusinessScale, InitiativeType, PlanningContext, Priority,
    Severity, StrategyProfile, TechnologyRole, ValidationIssue, ValidationResult, Wbs, WorkStream,
    WorkStreamCategory, WorkStreamPattern,
};
