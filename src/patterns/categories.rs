//! Fixed category vocabulary

pub const PHYSICAL_INFRASTRUCTURE: &str = "physical_infrastructure";
pub const TECHNOLOGY_SYSTEMS: &str = "technology_systems";
pub const OPERATIONS: &str = "operations";
pub const HUMAN_RESOURCES: &str = "human_resources";
pub const MARKETING_SALES: &str = "marketing_sales";
pub const LEGAL_COMPLIANCE: &str = "legal_compliance";
pub const FINANCIAL_MANAGEMENT: &str = "financial_management";
pub const SUPPLY_CHAIN: &str = "supply_chain";

/// Categories an LLM-generated pattern may use
pub const VOCABULARY: &[&str] = &[
    PHYSICAL_INFRASTRUCTURE,
    TECHNOLOGY_SYSTEMS,
    OPERATIONS,
    HUMAN_RESOURCES,
    MARKETING_SALES,
    LEGAL_COMPLIANCE,
    FINANCIAL_MANAGEMENT,
    SUPPLY_CHAIN,
];

/// Execution order used when dependencies have to be inferred without the LLM.
/// Categories not listed sort after all of these.
pub const DEPENDENCY_ORDER: &[&str] = &[
    LEGAL_COMPLIANCE,
    PHYSICAL_INFRASTRUCTURE,
    TECHNOLOGY_SYSTEMS,
    HUMAN_RESOURCES,
    OPERATIONS,
    MARKETING_SALES,
];

pub fn dependency_rank(category: &str) -> usize {
    DEPENDENCY_ORDER
        .iter()
        .position(|c| *c == category)
        .unwrap_or(DEPENDENCY_ORDER.len())
}

pub fn is_known(category: &str) -> bool {
    VOCABULARY.contains(&category)
}
