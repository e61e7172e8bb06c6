//! Rule-set validation: collected diagnostics for the rules editor.
//!
//! Errors (missing required values, out-of-range percentages) block a save
//! at the presentation layer; warnings (empty rule list, unreachable
//! escalation config) are advisory. Nothing here throws.

use traveler_types::{Diagnostic, SamplingRule, SamplingRuleKind, SamplingRuleSet, Severity, TravelerError};

/// Percentage rules must fall inside this range.
const PERCENTAGE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=100.0;

/// Validate one rule set and return collected diagnostics.
pub fn validate(set: &SamplingRuleSet) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    if set.rules.is_empty() {
        diagnostics.push(Diagnostic {
            rule: "primary_rules_present".into(),
            severity: Severity::Warning,
            message: format!("Rule set '{}' has no primary rules; no sampling will occur", set.name),
            subject_id: Some(set.id),
            edge: None,
            fix: Some("Add at least one sampling rule".into()),
        });
    }

    check_rule_values(&set.rules, "primary", &mut diagnostics);
    check_rule_values(&set.fallback_rules, "fallback", &mut diagnostics);

    if !set.fallback_rules.is_empty() {
        if set.fallback_threshold.is_none() {
            diagnostics.push(Diagnostic {
                rule: "fallback_threshold_present".into(),
                severity: Severity::Warning,
                message: format!(
                    "Rule set '{}' has fallback rules but no failure threshold; escalation will never auto-trigger",
                    set.name
                ),
                subject_id: Some(set.id),
                edge: None,
                fix: Some("Set a consecutive-failure threshold".into()),
            });
        }
        if set.fallback_duration.is_none() {
            diagnostics.push(Diagnostic {
                rule: "fallback_duration_present".into(),
                severity: Severity::Warning,
                message: format!(
                    "Rule set '{}' has fallback rules but no recovery duration; escalation will never auto-recover",
                    set.name
                ),
                subject_id: Some(set.id),
                edge: None,
                fix: Some("Set a consecutive-pass recovery duration".into()),
            });
        }
    }

    diagnostics
}

fn check_rule_values(rules: &[SamplingRule], which: &str, diagnostics: &mut Vec<Diagnostic>) {
    for rule in rules {
        if rule.rule_type.requires_value() && rule.value.is_none() {
            diagnostics.push(Diagnostic {
                rule: "rule_value_required".into(),
                severity: Severity::Error,
                message: format!(
                    "{} rule {} ({:?}) requires a value",
                    capitalize(which),
                    rule.id,
                    rule.rule_type
                ),
                subject_id: Some(rule.id),
                edge: None,
                fix: Some("Provide a numeric value for the rule".into()),
            });
        }

        if rule.rule_type == SamplingRuleKind::Percentage {
            if let Some(v) = rule.value {
                if !PERCENTAGE_RANGE.contains(&v) {
                    diagnostics.push(Diagnostic {
                        rule: "percentage_in_range".into(),
                        severity: Severity::Error,
                        message: format!(
                            "{} rule {} has percentage {} outside 0-100",
                            capitalize(which),
                            rule.id,
                            v
                        ),
                        subject_id: Some(rule.id),
                        edge: None,
                        fix: Some("Use a percentage between 0 and 100".into()),
                    });
                }
            }
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Validate; return `Err` if any `Error`-severity diagnostic found.
pub fn validate_or_raise(set: &SamplingRuleSet) -> traveler_types::Result<Vec<Diagnostic>> {
    let diagnostics = validate(set);
    if let Some(summary) = Diagnostic::error_summary(&diagnostics) {
        return Err(TravelerError::Validation(summary));
    }
    Ok(diagnostics)
}
