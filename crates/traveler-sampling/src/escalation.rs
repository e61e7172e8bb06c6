//! Two-state sampling regime: normal vs. escalated.
//!
//! Escalation is computed over the audit trail of recent inspection outcomes
//! at a step, combined with the step's rule-set configuration. Callers never
//! see the internal streak counters; they see only which regime currently
//! governs sampling decisions.

use serde::{Deserialize, Serialize};

use traveler_types::{InspectionOutcome, SamplingRule, SamplingRuleSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    Normal,
    Escalated,
}

/// Escalation configuration lifted out of a rule set.
///
/// Without fallback rules and a threshold the regime is permanently
/// [`Regime::Normal`]; without a recovery duration an escalated regime never
/// de-escalates on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscalationPolicy {
    /// Consecutive failures that trigger escalation.
    pub threshold: Option<u32>,
    /// Consecutive passes required to recover.
    pub recovery: Option<u32>,
    pub has_fallback_rules: bool,
}

impl EscalationPolicy {
    pub fn from_rule_set(set: &SamplingRuleSet) -> Self {
        Self {
            threshold: set.fallback_threshold,
            recovery: set.fallback_duration,
            has_fallback_rules: !set.fallback_rules.is_empty(),
        }
    }

    pub fn can_escalate(&self) -> bool {
        self.has_fallback_rules && self.threshold.is_some_and(|t| t > 0)
    }
}

/// Streak-tracking fold over inspection outcomes. Strictly two states; the
/// counters are internal.
#[derive(Debug, Clone)]
pub struct RegimeMachine {
    policy: EscalationPolicy,
    regime: Regime,
    consecutive_failures: u32,
    consecutive_passes: u32,
}

impl RegimeMachine {
    pub fn new(policy: EscalationPolicy) -> Self {
        Self {
            policy,
            regime: Regime::Normal,
            consecutive_failures: 0,
            consecutive_passes: 0,
        }
    }

    pub fn regime(&self) -> Regime {
        self.regime
    }

    /// Feed one inspection outcome and return the regime that now applies.
    pub fn observe(&mut self, passed: bool) -> Regime {
        if passed {
            self.consecutive_passes += 1;
            self.consecutive_failures = 0;
        } else {
            self.consecutive_failures += 1;
            self.consecutive_passes = 0;
        }

        match self.regime {
            Regime::Normal => {
                if self.policy.can_escalate()
                    && self.consecutive_failures >= self.policy.threshold.unwrap_or(u32::MAX)
                {
                    self.regime = Regime::Escalated;
                    self.consecutive_failures = 0;
                    tracing::debug!(
                        threshold = self.policy.threshold,
                        "Consecutive failures reached threshold; escalating sampling regime"
                    );
                }
            }
            Regime::Escalated => {
                if let Some(recovery) = self.policy.recovery {
                    if recovery > 0 && self.consecutive_passes >= recovery {
                        self.regime = Regime::Normal;
                        self.consecutive_passes = 0;
                        tracing::debug!(recovery, "Consecutive passes reached duration; sampling regime recovered");
                    }
                }
            }
        }

        self.regime
    }
}

/// Fold a chronological audit trail into the regime that applies now.
pub fn classify(policy: EscalationPolicy, outcomes: &[InspectionOutcome]) -> Regime {
    let mut machine = RegimeMachine::new(policy);
    for outcome in outcomes {
        machine.observe(outcome.passed);
    }
    machine.regime()
}

/// The rules currently governing sampling decisions. Escalation rules run in
/// addition to the primary rules while active, so the escalated list is the
/// primary rules followed by the fallback rules, each in priority order.
pub fn active_rules(set: &SamplingRuleSet, regime: Regime) -> Vec<&SamplingRule> {
    let mut rules = set.ordered_rules();
    if regime == Regime::Escalated {
        rules.extend(set.ordered_fallback_rules());
    }
    rules
}
