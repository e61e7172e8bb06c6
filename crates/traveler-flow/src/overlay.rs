//! Mode-specific node decoration.
//!
//! Overlays are additive: each apply function annotates matching nodes on an
//! already-built graph and never alters topology, so the base graph and its
//! decoration stay independently testable.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use traveler_types::{PartCount, StepMetrics};

use crate::bottleneck::{severity_by_step, BOTTLENECK_THRESHOLD, SEVERE_THRESHOLD};
use crate::graph::{FlowGraph, NodeRole};

/// Which family of overlay a flow mode wants. Used by the mode configuration
/// table; the caller picks the matching apply function and data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayKind {
    PartCount,
    Bottleneck,
    Rework,
    Quality,
}

/// Mode-specific decoration attached alongside a node's core data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Overlay {
    PartCount {
        active: u32,
        total: u32,
    },
    Bottleneck {
        severity: f64,
        flagged: bool,
        severe: bool,
    },
    Rework {
        visits: u32,
        max_visits: Option<u32>,
    },
    Quality {
        requires_signoff: bool,
        sampling_required: bool,
        min_sampling_rate: Option<f64>,
    },
}

/// Annotate nodes with part counts for work-order views. Steps without a
/// count entry are left undecorated.
pub fn apply_part_counts(graph: &mut FlowGraph, counts: &HashMap<i64, PartCount>) {
    for (&id, count) in counts {
        if let Some(node) = graph.node_mut(id) {
            node.overlay = Some(Overlay::PartCount {
                active: count.active,
                total: count.total,
            });
        }
    }
}

/// Annotate nodes with bottleneck severity for evaluation views.
pub fn apply_bottleneck_metrics(graph: &mut FlowGraph, metrics: &HashMap<i64, StepMetrics>) {
    for (id, severity) in severity_by_step(metrics) {
        if let Some(node) = graph.node_mut(id) {
            node.overlay = Some(Overlay::Bottleneck {
                severity,
                flagged: severity >= BOTTLENECK_THRESHOLD,
                severe: severity >= SEVERE_THRESHOLD,
            });
        }
    }
}

/// Annotate nodes with visit counts for rework views. The visit cap comes
/// from the node's own role.
pub fn apply_visit_counts(graph: &mut FlowGraph, visits: &HashMap<i64, u32>) {
    for (&id, &count) in visits {
        if let Some(node) = graph.node_mut(id) {
            let max_visits = match node.role {
                NodeRole::Rework { max_visits } => max_visits,
                _ => None,
            };
            node.overlay = Some(Overlay::Rework {
                visits: count,
                max_visits,
            });
        }
    }
}

/// Annotate QA-relevant nodes from their own flags. Nodes with neither flag
/// set are left undecorated.
pub fn apply_quality_flags(graph: &mut FlowGraph) {
    let flagged: Vec<i64> = graph
        .nodes()
        .iter()
        .filter(|n| n.qa.requires_signoff || n.qa.sampling_required)
        .map(|n| n.id)
        .collect();
    for id in flagged {
        if let Some(node) = graph.node_mut(id) {
            node.overlay = Some(Overlay::Quality {
                requires_signoff: node.qa.requires_signoff,
                sampling_required: node.qa.sampling_required,
                min_sampling_rate: node.qa.min_sampling_rate,
            });
        }
    }
}
