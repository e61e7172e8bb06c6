//! Bottleneck severity scoring for the evaluation overlay.

use std::collections::HashMap;

use traveler_types::StepMetrics;

/// Severity at or above which a step is flagged as a bottleneck.
pub const BOTTLENECK_THRESHOLD: f64 = 0.6;
/// Severity at or above which the flag is escalated to severe.
pub const SEVERE_THRESHOLD: f64 = 0.8;

/// Score one step against the peer extremes:
/// `min(1, 0.7 * dwell/max_dwell + 0.3 * max(0, 1 - throughput/mean_throughput))`.
///
/// Non-positive `max_dwell` or `mean_throughput` zero their term, so a step
/// set with no usable metrics scores 0 everywhere.
pub fn severity(dwell: f64, max_dwell: f64, throughput: f64, mean_throughput: f64) -> f64 {
    let dwell_term = if max_dwell > 0.0 {
        dwell / max_dwell
    } else {
        0.0
    };
    let throughput_term = if mean_throughput > 0.0 {
        (1.0 - throughput / mean_throughput).max(0.0)
    } else {
        0.0
    };
    (0.7 * dwell_term + 0.3 * throughput_term).min(1.0)
}

/// Severity per step id over a full metrics snapshot. Empty input yields an
/// empty map.
pub fn severity_by_step(metrics: &HashMap<i64, StepMetrics>) -> HashMap<i64, f64> {
    if metrics.is_empty() {
        return HashMap::new();
    }
    let max_dwell = metrics
        .values()
        .map(|m| m.avg_dwell_minutes)
        .fold(0.0_f64, f64::max);
    let mean_throughput =
        metrics.values().map(|m| m.throughput_per_hour).sum::<f64>() / metrics.len() as f64;

    metrics
        .iter()
        .map(|(&id, m)| {
            (
                id,
                severity(
                    m.avg_dwell_minutes,
                    max_dwell,
                    m.throughput_per_hour,
                    mean_throughput,
                ),
            )
        })
        .collect()
}
