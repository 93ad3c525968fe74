use crate::output::{Priority, StrategyProfile, WorkStreamCategory, WorkStreamPattern};
use crate::pipeline::error::PipelineError;
use crate::pipeline::phase_trait::PipelineStage;
use async_trait::async_trait;
use tracing::{debug, info, warn};

const STAGE: &str = "weighter";

/// Allowed drift of the adjusted total before weights are rescaled
const RENORMALIZE_THRESHOLD: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct WeighterInput {
    pub pattern: WorkStreamPattern,
    pub profile: StrategyProfile,
}

/// Applies a strategy profile's effort targets to a base pattern.
///
/// Profile weights replace base weights for matching categories and unknown
/// categories are appended at high priority. When the resulting total drifts
/// more than one point from 100, every weight is scaled by `100 / total`. The
/// returned pattern always reports `total_weight == 100`. A "traditional"
/// profile, or one whose adjustments leave a non-positive total, returns the
/// base pattern untouched.
pub fn adjust_pattern(base: &WorkStreamPattern, profile: &StrategyProfile) -> WorkStreamPattern {
    if profile.is_traditional() {
        return base.clone();
    }

    let mut streams = base.streams.clone();
    for (category, target) in &profile.effort_adjustments {
        match streams.iter_mut().find(|s| &s.category == category) {
            Some(stream) => {
                debug!(
                    category = %category,
                    from = stream.weight,
                    to = *target,
                    "Overriding category weight"
                );
                stream.weight = *target;
            }
            None => {
                debug!(category = %category, weight = *target, "Adding strategic category");
                streams.push(
                    WorkStreamCategory::new(category.clone(), *target, Priority::High)
                        .with_description(format!("Strategic {} workstream", category)),
                );
            }
        }
    }

    let total: f64 = streams.iter().map(|s| s.weight).sum();
    if total <= 0.0 {
        warn!(
            archetype = %profile.archetype,
            total,
            "Strategy adjustments leave no effort to distribute, keeping base pattern"
        );
        return base.clone();
    }

    if (total - 100.0).abs() > RENORMALIZE_THRESHOLD {
        let factor = 100.0 / total;
        for stream in &mut streams {
            stream.weight *= factor;
        }
        debug!(raw_total = total, factor, "Renormalized pattern weights");
    }

    WorkStreamPattern {
        initiative_type: base.initiative_type,
        streams,
        total_weight: Some(100.0),
    }
}

/// Stage wrapper around [`adjust_pattern`]
#[derive(Debug, Default, Clone, Copy)]
pub struct AdaptivePatternWeighter;

#[async_trait]
impl PipelineStage for AdaptivePatternWeighter {
    type Input = WeighterInput;
    type Output = WorkStreamPattern;

    fn name(&self) -> &'static str {
        STAGE
    }

    async fn process(&self, input: &WeighterInput) -> Result<WorkStreamPattern, PipelineError> {
        let adjusted = adjust_pattern(&input.pattern, &input.profile);
        info!(
            stage = STAGE,
            archetype = %input.profile.archetype,
            streams = adjusted.streams.len(),
            "Pattern weighted for strategy profile"
        );
        Ok(adjusted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::InitiativeType;
    use std::collections::BTreeMap;
    use yare::parameterized;

    fn base() -> WorkStreamPattern {
        WorkStreamPattern {
            initiative_type: InitiativeType::BusinessLaunch,
            streams: vec![
                WorkStreamCategory::new("physical_infrastructure", 40.0, Priority::Critical),
                WorkStreamCategory::new("technology_systems", 20.0, Priority::Medium),
                WorkStreamCategory::new("operations", 40.0, Priority::Critical),
            ],
            total_weight: Some(100.0),
        }
    }

    fn profile(archetype: &str, adjustments: &[(&str, f64)]) -> StrategyProfile {
        StrategyProfile {
            archetype: archetype.to_string(),
            digital_intensity: 50.0,
            needs_platform: true,
            technology_role_override: None,
            effort_adjustments: adjustments
                .iter()
                .map(|(c, w)| (c.to_string(), *w))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[parameterized(
        lowercase = { "traditional" },
        capitalized = { "Traditional" },
    )]
    fn test_traditional_returns_base_unchanged(archetype: &str) {
        let base = base();
        let adjusted = adjust_pattern(&base, &profile(archetype, &[("technology_systems", 80.0)]));
        assert_eq!(adjusted, base);
    }

    #[test]
    fn test_override_within_threshold_keeps_raw_weights() {
        let adjusted = adjust_pattern(
            &base(),
            &profile(
                "digital_hybrid",
                &[("technology_systems", 30.0), ("operations", 30.5)],
            ),
        );

        let weights: Vec<f64> = adjusted.streams.iter().map(|s| s.weight).collect();
        assert_eq!(weights, vec![40.0, 30.0, 30.5]);
        assert_eq!(adjusted.total_weight, Some(100.0));
    }

    #[test]
    fn test_renormalizes_raw_total_of_140() {
        // 40 + 60 + 40 = 140
        let adjusted = adjust_pattern(
            &base(),
            &profile("platform", &[("technology_systems", 60.0)]),
        );

        let factor = 100.0 / 140.0;
        let expected = [40.0 * factor, 60.0 * factor, 40.0 * factor];
        for (stream, want) in adjusted.streams.iter().zip(expected) {
            assert!((stream.weight - want).abs() < 1e-9);
        }
        assert!((adjusted.weight_sum() - 100.0).abs() < 1e-9);
        assert_eq!(adjusted.total_weight, Some(100.0));
    }

    #[test]
    fn test_unknown_category_is_appended() {
        let adjusted = adjust_pattern(&base(), &profile("platform", &[("supply_chain", 10.0)]));

        let added = adjusted.streams.last().unwrap();
        assert_eq!(added.category, "supply_chain");
        assert_eq!(added.priority, Priority::High);
        assert_eq!(
            added.description.as_deref(),
            Some("Strategic supply_chain workstream")
        );
        assert_eq!(adjusted.streams.len(), 4);
        assert!((adjusted.weight_sum() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_base_is_not_mutated() {
        let base = base();
        let _ = adjust_pattern(&base, &profile("platform", &[("operations", 90.0)]));
        assert_eq!(base.streams[2].weight, 40.0);
    }

    #[test]
    fn test_non_positive_total_keeps_base_pattern() {
        let base = WorkStreamPattern {
            initiative_type: InitiativeType::General,
            streams: vec![WorkStreamCategory::new("operations", 100.0, Priority::High)],
            total_weight: Some(100.0),
        };

        let adjusted = adjust_pattern(&base, &profile("platform", &[("operations", 0.0)]));

        assert_eq!(adjusted, base);
        assert_eq!(adjusted.weight_sum(), 100.0);
    }

    #[tokio::test]
    async fn test_weighter_never_emits_empty_weights() {
        let input = WeighterInput {
            pattern: base(),
            profile: profile(
                "platform",
                &[
                    ("physical_infrastructure", 0.0),
                    ("technology_systems", 0.0),
                    ("operations", 0.0),
                ],
            ),
        };

        let adjusted = AdaptivePatternWeighter.process(&input).await.unwrap();

        assert_eq!(adjusted, base());
        assert!(crate::patterns::validate_pattern_weights(&adjusted));
    }
}
