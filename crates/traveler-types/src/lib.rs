//! Shared types, errors, and diagnostics for the Traveler flow core.
//!
//! This crate provides the foundational types used across the other Traveler crates:
//! - `TravelerError` — unified error taxonomy
//! - `Diagnostic` / `Severity` — collected validation findings
//! - record types mirroring the upstream store (steps, edges, sampling rules, metrics)

use serde::{Deserialize, Serialize};

pub mod records;

pub use records::{
    ConditionOperator, DecisionKind, EdgeKind, InspectionOutcome, MeasurementCondition, PartCount,
    ProcessStep, SamplingRule, SamplingRuleKind, SamplingRuleSet, Step, StepEdge, StepMetrics,
    TerminalStatus,
};

/// Unified error type for all Traveler subsystems.
#[derive(Debug, thiserror::Error)]
pub enum TravelerError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Record decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// A convenience alias for `Result<T, TravelerError>`.
pub type Result<T> = std::result::Result<T, TravelerError>;

// ---------------------------------------------------------------------------
// Diagnostics — collected validation findings
// ---------------------------------------------------------------------------

/// A single validation finding. Errors block a save at the presentation
/// layer; warnings are advisory only. Nothing in the core throws on either.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub rule: String,
    pub severity: Severity,
    pub message: String,
    /// Id of the offending record (step or sampling rule), when there is one.
    pub subject_id: Option<i64>,
    /// `(from_step, to_step)` for edge-level findings.
    pub edge: Option<(i64, i64)>,
    pub fix: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Diagnostic {
    /// Collect the messages of all `Error`-severity findings, or `None` if
    /// there are none. Shared by the `validate_or_raise` entry points.
    pub fn error_summary(diagnostics: &[Diagnostic]) -> Option<String> {
        let errors: Vec<_> = diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .map(|d| d.message.clone())
            .collect();
        if errors.is_empty() {
            None
        } else {
            Some(errors.join("; "))
        }
    }
}
