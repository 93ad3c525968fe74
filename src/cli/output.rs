//! Output formatting for the CLI
//!
//! JSON and YAML wrap the WBS with generation metadata; the human format is a
//! compact tree meant for a terminal.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::output::{Severity, Wbs, WorkStreamCategory};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Human,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    pub business: String,
    pub generated_at: DateTime<Utc>,
    pub generation_time_ms: u64,
    pub provider: String,
    pub model: String,
}

/// A generated WBS plus how it was produced
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WbsReport {
    pub metadata: ReportMetadata,
    pub wbs: Wbs,
}

/// One registered pattern as listed by `patterns`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternSummary {
    pub initiative_type: String,
    pub name: String,
    pub streams: Vec<WorkStreamCategory>,
    pub total_weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub available: bool,
    pub message: String,
    pub details: Option<String>,
}

impl HealthStatus {
    pub fn available(message: impl Into<String>) -> Self {
        Self {
            available: true,
            message: message.into(),
            details: None,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            available: false,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_report(&self, report: &WbsReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(report).context("Failed to serialize WBS to JSON")
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(report).context("Failed to serialize WBS to YAML")
            }
            OutputFormat::Human => Ok(self.format_report_human(report)),
        }
    }

    pub fn format_patterns(&self, patterns: &[PatternSummary]) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(patterns)
                .context("Failed to serialize patterns to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(patterns).context("Failed to serialize patterns to YAML")
            }
            OutputFormat::Human => Ok(self.format_patterns_human(patterns)),
        }
    }

    pub fn format_health(&self, results: &BTreeMap<String, HealthStatus>) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(results)
                .context("Failed to serialize health status to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(results).context("Failed to serialize health status to YAML")
            }
            OutputFormat::Human => Ok(self.format_health_human(results)),
        }
    }

    fn format_report_human(&self, report: &WbsReport) -> String {
        let wbs = &report.wbs;
        let validation = &wbs.validation_report;
        let mut output = String::new();

        if validation.is_valid && !validation.has_critical_issues() {
            output.push_str(&format!(
                "\u{2713} Work Breakdown Structure: {}\n",
                report.metadata.business
            ));
        } else {
            output.push_str(&format!(
                "\u{26A0} Work Breakdown Structure: {} (needs review)\n",
                report.metadata.business
            ));
        }
        output.push_str(RULE);
        output.push_str("\n\n");

        output.push_str(&format!(
            "Initiative:    {} ({})\n",
            wbs.intent.initiative_type,
            wbs.intent.technology_role.as_str()
        ));
        output.push_str(&format!("Model:         {}\n", wbs.intent.business_model));
        output.push_str(&format!(
            "Pattern:       {} categories\n\n",
            wbs.pattern.streams.len()
        ));

        output.push_str("Workstreams:\n");
        let count = wbs.workstreams.len();
        for (i, ws) in wbs.workstreams.iter().enumerate() {
            let is_last = i + 1 == count;
            let connector = if is_last { "\u{2514}" } else { "\u{251C}" };
            let rail = if is_last { " " } else { "\u{2502}" };

            output.push_str(&format!(
                "{}\u{2500} {} {} [{}] {:.0}% {}\n",
                connector,
                ws.id,
                ws.name,
                ws.category,
                ws.proportional_effort,
                ws.priority.as_str()
            ));
            for deliverable in &ws.deliverables {
                output.push_str(&format!("{}    - {}\n", rail, deliverable));
            }
            if !ws.dependencies.is_empty() {
                output.push_str(&format!(
                    "{}    Depends on: {}\n",
                    rail,
                    ws.dependencies.join(", ")
                ));
            }
        }
        output.push('\n');

        output.push_str(&format!(
            "Validation: coherence {:.0}% ({})\n",
            validation.coherence_score * 100.0,
            if validation.is_valid { "valid" } else { "invalid" }
        ));
        for issue in &validation.issues {
            let marker = match issue.severity {
                Severity::Critical => "\u{2717}",
                Severity::Warning => "\u{26A0}",
                Severity::Info => "i",
            };
            let affected = if issue.affected_streams.is_empty() {
                String::new()
            } else {
                format!(" [{}]", issue.affected_streams.join(", "))
            };
            output.push_str(&format!("  {} {}{}\n", marker, issue.message, affected));
        }
        for warning in &validation.warnings {
            output.push_str(&format!("  \u{26A0} {}\n", warning));
        }
        if !validation.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in &validation.suggestions {
                output.push_str(&format!("  - {}\n", suggestion));
            }
        }

        output.push_str(&format!(
            "\nConfidence: {} {:.0}%\n",
            confidence_bar(wbs.confidence),
            wbs.confidence * 100.0
        ));
        output.push_str(&format!(
            "\nGenerated in {}ms by {} ({})\n",
            report.metadata.generation_time_ms, report.metadata.provider, report.metadata.model
        ));

        output
    }

    fn format_patterns_human(&self, patterns: &[PatternSummary]) -> String {
        let mut output = String::new();

        output.push_str("Registered Patterns\n");
        output.push_str(RULE);
        output.push_str("\n\n");

        for pattern in patterns {
            output.push_str(&format!("{} ({})\n", pattern.name, pattern.initiative_type));
            let count = pattern.streams.len();
            for (i, stream) in pattern.streams.iter().enumerate() {
                let connector = if i + 1 == count { "\u{2514}" } else { "\u{251C}" };
                output.push_str(&format!(
                    "{}\u{2500} {:<26} {:>5.1}%  {}\n",
                    connector,
                    stream.category,
                    stream.weight,
                    stream.priority.as_str()
                ));
            }
            output.push_str(&format!("   Total: {:.1}%\n\n", pattern.total_weight));
        }

        output
    }

    fn format_health_human(&self, results: &BTreeMap<String, HealthStatus>) -> String {
        let mut output = String::new();

        output.push_str("Backend Health Status\n");
        output.push_str(RULE);
        output.push_str("\n\n");

        for (backend, status) in results {
            let symbol = if status.available { "\u{2713}" } else { "\u{2717}" };
            output.push_str(&format!("{} {}\n", symbol, backend));
            output.push_str(&format!("  Message: {}\n", status.message));
            if let Some(details) = &status.details {
                output.push_str(&format!("  Details: {}\n", details));
            }
            output.push('\n');
        }

        output
    }
}

fn confidence_bar(confidence: f64) -> String {
    let filled = ((confidence.clamp(0.0, 1.0) * 10.0).round()) as usize;
    "\u{2588}".repeat(filled) + &"\u{2591}".repeat(10 - filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{
        BusinessIntent, InitiativeType, Priority, TechnologyRole, ValidationIssue,
        ValidationResult, WorkStream, WorkStreamPattern,
    };

    fn report() -> WbsReport {
        WbsReport {
            metadata: ReportMetadata {
                business: "Bean There".to_string(),
                generated_at: Utc::now(),
                generation_time_ms: 1234,
                provider: "Anthropic".to_string(),
                model: "claude-3-5-sonnet-latest".to_string(),
            },
            wbs: Wbs {
                intent: BusinessIntent {
                    initiative_type: InitiativeType::BusinessLaunch,
                    technology_role: TechnologyRole::OperationalTool,
                    business_model: "retail".to_string(),
                    primary_value_creation: "coffee".to_string(),
                    is_physical: true,
                    is_digital: false,
                    confidence: 0.9,
                },
                pattern: WorkStreamPattern {
                    initiative_type: InitiativeType::BusinessLaunch,
                    streams: vec![WorkStreamCategory::new(
                        "legal_compliance",
                        100.0,
                        Priority::High,
                    )],
                    total_weight: Some(100.0),
                },
                workstreams: vec![WorkStream {
                    id: "WS001".to_string(),
                    name: "Permits & Licensing".to_string(),
                    category: "legal_compliance".to_string(),
                    description: "Food service permits".to_string(),
                    proportional_effort: 100.0,
                    priority: Priority::High,
                    deliverables: vec![
                        "Health permit".to_string(),
                        "Business license".to_string(),
                        "Insurance".to_string(),
                    ],
                    dependencies: vec![],
                    confidence: 0.95,
                }],
                confidence: 0.86,
                validation_report: ValidationResult {
                    is_valid: true,
                    coherence_score: 0.8,
                    issues: vec![ValidationIssue {
                        severity: Severity::Critical,
                        message: "No operations workstream".to_string(),
                        affected_streams: vec!["WS001".to_string()],
                    }],
                    warnings: vec![],
                    suggestions: vec!["Add a staffing plan".to_string()],
                },
            },
        }
    }

    #[test]
    fn test_json_report_wraps_metadata() {
        let output = OutputFormatter::new(OutputFormat::Json)
            .format_report(&report())
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["metadata"]["generationTimeMs"], 1234);
        assert!(value["metadata"]["generatedAt"].is_string());
        assert_eq!(value["wbs"]["workstreams"][0]["id"], "WS001");
        assert_eq!(value["wbs"]["validationReport"]["coherenceScore"], 0.8);
    }

    #[test]
    fn test_yaml_report_round_trips() {
        let output = OutputFormatter::new(OutputFormat::Yaml)
            .format_report(&report())
            .unwrap();

        let parsed: WbsReport = serde_yaml::from_str(&output).unwrap();
        assert_eq!(parsed.wbs, report().wbs);
    }

    #[test]
    fn test_human_report() {
        let output = OutputFormatter::new(OutputFormat::Human)
            .format_report(&report())
            .unwrap();

        assert!(output.contains("Bean There (needs review)"));
        assert!(output.contains("WS001 Permits & Licensing [legal_compliance] 100% high"));
        assert!(output.contains("- Health permit"));
        assert!(output.contains("No operations workstream [WS001]"));
        assert!(output.contains("Add a staffing plan"));
        assert!(output.contains("86%"));
        assert!(output.contains("1234ms"));
    }

    #[test]
    fn test_patterns_human() {
        let patterns = vec![PatternSummary {
            initiative_type: "software_development".to_string(),
            name: "Software Development".to_string(),
            streams: vec![WorkStreamCategory::new("technology_systems", 60.0, Priority::Critical)],
            total_weight: 60.0,
        }];

        let output = OutputFormatter::new(OutputFormat::Human)
            .format_patterns(&patterns)
            .unwrap();
        assert!(output.contains("Software Development (software_development)"));
        assert!(output.contains("technology_systems"));
        assert!(output.contains("60.0%"));
    }

    #[test]
    fn test_health_human() {
        let mut results = BTreeMap::new();
        results.insert("Ollama".to_string(), HealthStatus::available("Connected"));
        results.insert(
            "OpenAI".to_string(),
            HealthStatus::unavailable("API key not configured").with_details("Set OPENAI_API_KEY"),
        );

        let output = OutputFormatter::new(OutputFormat::Human)
            .format_health(&results)
            .unwrap();
        assert!(output.contains("\u{2713} Ollama"));
        assert!(output.contains("\u{2717} OpenAI"));
        assert!(output.contains("Set OPENAI_API_KEY"));
    }

    #[test]
    fn test_confidence_bar() {
        assert_eq!(confidence_bar(0.86).chars().filter(|c| *c == '\u{2588}').count(), 9);
        assert_eq!(confidence_bar(1.5).chars().count(), 10);
        assert_eq!(confidence_bar(0.0), "\u{2591}".repeat(10));
    }
}
