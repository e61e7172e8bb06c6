//! Sampling escalation engine.
//!
//! Given a step's sampling rule set and its inspection audit trail, this
//! crate decides which regime (normal vs. escalated) currently governs
//! sampling, estimates the inspection-coverage the configuration implies,
//! and validates the configuration for the rules editor. Pure synchronous
//! computation over complete snapshots; the per-part sampling decision
//! itself lives outside this repository.

pub mod coverage;
pub mod escalation;
pub mod validation;

pub use coverage::{
    combined, estimate, estimate_rule_set, CoverageEstimate, RuleSetCoverage, DEFAULT_RANDOM_RATE,
};
pub use escalation::{active_rules, classify, EscalationPolicy, Regime, RegimeMachine};
pub use validation::{validate, validate_or_raise};
