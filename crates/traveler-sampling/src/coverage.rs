//! Inspection-coverage estimation for sampling rule sets.
//!
//! The estimate is a diagnostic and validation aid for the rules editor, not
//! the per-part sampling decision itself. Percentage-like rules may overlap
//! in which parts they select, so they combine by max rather than sum;
//! bounded rules (first/last N) select an absolute number of parts and
//! compose additively.

use serde::Serialize;

use traveler_types::{SamplingRule, SamplingRuleKind, SamplingRuleSet};

/// Placeholder rate shown for random rules configured without a usable
/// percentage.
pub const DEFAULT_RANDOM_RATE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoverageEstimate {
    /// Approximate fraction of parts inspected, 0..=100.
    pub percentage: f64,
    /// Extra parts selected regardless of batch size.
    pub fixed_count: u32,
    pub is_full: bool,
}

impl CoverageEstimate {
    pub const ZERO: CoverageEstimate = CoverageEstimate {
        percentage: 0.0,
        fixed_count: 0,
        is_full: false,
    };

    pub const FULL: CoverageEstimate = CoverageEstimate {
        percentage: 100.0,
        fixed_count: 0,
        is_full: true,
    };

    /// Human-readable rendering for the rules editor, e.g. `"~10% +5 parts"`.
    pub fn summary(&self) -> String {
        if self.is_full {
            return "100%".to_string();
        }
        match (self.percentage > 0.0, self.fixed_count > 0) {
            (true, true) => format!(
                "~{}% +{} parts",
                format_rate(self.percentage),
                self.fixed_count
            ),
            (true, false) => format!("~{}%", format_rate(self.percentage)),
            (false, true) => format!("+{} parts", self.fixed_count),
            (false, false) => "0%".to_string(),
        }
    }
}

fn format_rate(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        format!("{value:.1}")
    }
}

/// Estimate the coverage of one rule list.
///
/// An `all` rule short-circuits the whole set; every other rule folds into
/// either the percentage max or the fixed-count sum. Rules of unrecognized
/// types contribute nothing.
pub fn estimate(rules: &[SamplingRule]) -> CoverageEstimate {
    let mut percentage: f64 = 0.0;
    let mut fixed_count: u32 = 0;

    for rule in rules {
        match rule.rule_type {
            SamplingRuleKind::All => return CoverageEstimate::FULL,
            SamplingRuleKind::None | SamplingRuleKind::Unknown => {}
            SamplingRuleKind::Percentage => {
                if let Some(v) = rule.value {
                    percentage = percentage.max(v);
                }
            }
            SamplingRuleKind::EveryNthPart => {
                if let Some(n) = rule.value.filter(|&n| n > 0.0) {
                    percentage = percentage.max(100.0 / n);
                }
            }
            SamplingRuleKind::FirstNParts | SamplingRuleKind::LastNParts => {
                if let Some(n) = rule.value.filter(|&n| n > 0.0) {
                    fixed_count += n as u32;
                }
            }
            SamplingRuleKind::FirstAndLast => fixed_count += 2,
            SamplingRuleKind::Random | SamplingRuleKind::RandomWithinN => {
                let rate = rule
                    .value
                    .filter(|&v| v > 0.0)
                    .unwrap_or(DEFAULT_RANDOM_RATE);
                percentage = percentage.max(rate);
            }
        }
    }

    let percentage = percentage.min(100.0);
    CoverageEstimate {
        percentage,
        fixed_count,
        is_full: percentage >= 100.0,
    }
}

/// Combine the primary estimate with the fallback estimate for the escalated
/// regime. Escalation rules run in addition to the primary rules while
/// active: percentages add (capped at 100), fixed counts add, and either
/// side being full makes the combination full.
pub fn combined(primary: CoverageEstimate, fallback: CoverageEstimate) -> CoverageEstimate {
    let is_full =
        primary.is_full || fallback.is_full || primary.percentage + fallback.percentage >= 100.0;
    CoverageEstimate {
        percentage: if is_full {
            100.0
        } else {
            primary.percentage + fallback.percentage
        },
        fixed_count: primary.fixed_count + fallback.fixed_count,
        is_full,
    }
}

/// Coverage of a whole rule set: the normal-regime estimate, plus the
/// escalated combination when fallback rules exist.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RuleSetCoverage {
    pub normal: CoverageEstimate,
    pub escalated: Option<CoverageEstimate>,
}

pub fn estimate_rule_set(set: &SamplingRuleSet) -> RuleSetCoverage {
    let normal = estimate(&set.rules);
    let escalated = if set.fallback_rules.is_empty() {
        None
    } else {
        Some(combined(normal, estimate(&set.fallback_rules)))
    };
    RuleSetCoverage { normal, escalated }
}
