//! Handle normalization: keeps edge connection points consistent with the
//! current role of their source node.
//!
//! Decision nodes expose exactly two named outputs, `"pass"` and `"fail"`;
//! every other node exposes one unnamed output and one unnamed input. An edge
//! created while its source was one role can survive a later role change
//! (e.g. the user toggles "decision point" off) and end up referencing a
//! handle that no longer exists, which breaks rendering. This pass runs after
//! every node or edge change and rewrites such edges instead of dropping them.

use std::collections::HashSet;

use crate::graph::{FlowEdge, FlowNode, HANDLE_FAIL, HANDLE_PASS};

/// Rewrite each edge's `source_handle` to match its source node's role:
/// decision-sourced edges get `"pass"` when their handle is missing or
/// unrecognized (fail-safe default, never a drop); non-decision-sourced
/// edges lose any handle they carry.
pub fn normalize_handles(nodes: &[FlowNode], edges: &mut [FlowEdge]) {
    let decision_ids: HashSet<i64> = nodes
        .iter()
        .filter(|n| n.role.is_decision())
        .map(|n| n.id)
        .collect();

    for edge in edges {
        if decision_ids.contains(&edge.source) {
            match edge.source_handle.as_deref() {
                Some(HANDLE_PASS) | Some(HANDLE_FAIL) => {}
                _ => edge.source_handle = Some(HANDLE_PASS.to_string()),
            }
        } else if edge.source_handle.is_some() {
            edge.source_handle = None;
        }
    }
}
