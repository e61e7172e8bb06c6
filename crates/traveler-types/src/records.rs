//! Record types mirroring the upstream store.
//!
//! These are the raw shapes handed over by the REST layer: process steps and
//! their routing edges, sampling rule sets, and per-step aggregates. The flow
//! and sampling crates derive everything else from complete snapshots of
//! these records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single manufacturing operation within a process definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Explicit role override. `"task"` is the generic default and defers to
    /// derivation from the flags below.
    #[serde(default)]
    pub step_type: Option<String>,
    #[serde(default)]
    pub is_decision_point: bool,
    #[serde(default)]
    pub decision_type: Option<DecisionKind>,
    #[serde(default)]
    pub is_terminal: bool,
    #[serde(default)]
    pub terminal_status: Option<TerminalStatus>,
    /// Rework cap. `None` means unlimited visits.
    #[serde(default)]
    pub max_visits: Option<u32>,
    /// Expected dwell at this step, in minutes.
    #[serde(default)]
    pub expected_duration: Option<f64>,
    #[serde(default)]
    pub requires_qa_signoff: bool,
    #[serde(default)]
    pub sampling_required: bool,
    #[serde(default)]
    pub min_sampling_rate: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    QaResult,
    Measurement,
    Manual,
}

/// Disposition a part ends in when its journey stops at a terminal step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalStatus {
    Completed,
    Shipped,
    Stock,
    Scrapped,
    Returned,
    AwaitingPickup,
    CoreBanked,
    RmaClosed,
}

/// Membership of a [`Step`] in one process, with its sequence position.
///
/// `order` values are sort keys only; they are not guaranteed contiguous or
/// unique within a process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessStep {
    pub id: i64,
    pub order: i64,
    #[serde(default)]
    pub is_entry_point: bool,
    pub step: Step,
}

/// A directed transition between two steps of the same process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepEdge {
    pub id: i64,
    pub from_step: i64,
    pub to_step: i64,
    #[serde(default)]
    pub edge_type: EdgeKind,
    #[serde(default)]
    pub condition_measurement: Option<String>,
    #[serde(default)]
    pub condition_operator: Option<ConditionOperator>,
    #[serde(default)]
    pub condition_value: Option<f64>,
}

impl StepEdge {
    /// The measurement trigger on this edge, if all three condition fields
    /// are present. Partially-populated conditions are treated as absent.
    pub fn condition(&self) -> Option<MeasurementCondition> {
        Some(MeasurementCondition {
            measurement: self.condition_measurement.clone()?,
            operator: self.condition_operator?,
            value: self.condition_value?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Normal/pass transition.
    #[default]
    Default,
    /// Failure/reject transition.
    Alternate,
    /// Taken when a rework visit cap is exceeded.
    Escalation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Gte,
    Lte,
    Eq,
}

/// A fully-populated measurement trigger condition from a [`StepEdge`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementCondition {
    pub measurement: String,
    pub operator: ConditionOperator,
    pub value: f64,
}

impl MeasurementCondition {
    pub fn is_met(&self, reading: f64) -> bool {
        match self.operator {
            ConditionOperator::Gte => reading >= self.value,
            ConditionOperator::Lte => reading <= self.value,
            ConditionOperator::Eq => (reading - self.value).abs() < f64::EPSILON,
        }
    }
}

// ---------------------------------------------------------------------------
// Sampling rules
// ---------------------------------------------------------------------------

/// One sampling rule inside a rule set. `order` is evaluation priority,
/// lower first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingRule {
    pub id: i64,
    pub rule_type: SamplingRuleKind,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub order: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingRuleKind {
    All,
    None,
    Percentage,
    #[serde(alias = "every_nth")]
    EveryNthPart,
    #[serde(alias = "first_n")]
    FirstNParts,
    #[serde(alias = "last_n")]
    LastNParts,
    FirstAndLast,
    Random,
    RandomWithinN,
    /// Rule types this build does not know about contribute nothing to
    /// coverage and never error.
    #[serde(other)]
    Unknown,
}

impl SamplingRuleKind {
    /// Whether a rule of this kind is invalid without a numeric value.
    pub fn requires_value(self) -> bool {
        matches!(
            self,
            SamplingRuleKind::Percentage
                | SamplingRuleKind::EveryNthPart
                | SamplingRuleKind::FirstNParts
                | SamplingRuleKind::LastNParts
                | SamplingRuleKind::RandomWithinN
        )
    }
}

/// An ordered collection of sampling rules, with an optional stricter
/// fallback set activated after consecutive failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingRuleSet {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub rules: Vec<SamplingRule>,
    #[serde(default)]
    pub fallback_rules: Vec<SamplingRule>,
    /// Consecutive-failure count that triggers escalation.
    #[serde(default)]
    pub fallback_threshold: Option<u32>,
    /// Consecutive-pass count required to de-escalate.
    #[serde(default)]
    pub fallback_duration: Option<u32>,
}

impl SamplingRuleSet {
    /// Primary rules sorted by evaluation priority (stable on ties).
    pub fn ordered_rules(&self) -> Vec<&SamplingRule> {
        let mut rules: Vec<&SamplingRule> = self.rules.iter().collect();
        rules.sort_by_key(|r| r.order);
        rules
    }

    /// Fallback rules sorted by evaluation priority (stable on ties).
    pub fn ordered_fallback_rules(&self) -> Vec<&SamplingRule> {
        let mut rules: Vec<&SamplingRule> = self.fallback_rules.iter().collect();
        rules.sort_by_key(|r| r.order);
        rules
    }
}

// ---------------------------------------------------------------------------
// Per-step aggregates and audit records
// ---------------------------------------------------------------------------

/// Aggregated metrics for one step, supplied by the upstream store.
/// Values may be synthetic or estimated upstream; the flow layer only
/// consumes and displays them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StepMetrics {
    pub avg_dwell_minutes: f64,
    pub avg_transition_minutes: f64,
    pub throughput_per_hour: f64,
    pub pass_rate: f64,
    pub rework_rate: f64,
    pub total_parts: u32,
    #[serde(default)]
    pub estimated: bool,
}

/// Part counts at one step for work-order views.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PartCount {
    pub active: u32,
    pub total: u32,
}

/// One entry of the inspection audit trail at a step. The escalation engine
/// folds over these in chronological order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectionOutcome {
    pub passed: bool,
    pub recorded_at: DateTime<Utc>,
}
