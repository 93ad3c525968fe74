use crate::output::Priority;

const MAX_STREAM_CONFIDENCE: f64 = 0.98;
const MAX_WEIGHT_BONUS: f64 = 0.05;

const INTENT_SHARE: f64 = 0.3;
const COHERENCE_SHARE: f64 = 0.4;
const STREAM_SHARE: f64 = 0.3;

pub fn base_confidence(priority: Priority) -> f64 {
    match priority {
        Priority::Critical => 0.95,
        Priority::High => 0.90,
        Priority::Medium => 0.85,
        Priority::Low => 0.80,
    }
}

/// Deterministic workstream confidence: priority base plus a weight bonus,
/// capped at 0.98. `weight` is a percentage.
pub fn stream_confidence(priority: Priority, weight: f64) -> f64 {
    let bonus = (weight / 100.0 * MAX_WEIGHT_BONUS).clamp(0.0, MAX_WEIGHT_BONUS);
    (base_confidence(priority) + bonus).min(MAX_STREAM_CONFIDENCE)
}

/// Overall WBS confidence, clamped to `[0, 1]`. An empty stream list
/// contributes zero.
pub fn compose_confidence(intent: f64, coherence: f64, streams: &[f64]) -> f64 {
    let mean_stream = if streams.is_empty() {
        0.0
    } else {
        streams.iter().sum::<f64>() / streams.len() as f64
    };

    let composed = INTENT_SHARE * intent + COHERENCE_SHARE * coherence + STREAM_SHARE * mean_stream;
    if composed.is_nan() {
        return 0.0;
    }
    composed.clamp(0.0, 1.0)
}
