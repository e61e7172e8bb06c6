//! Graph builder: raw step/edge records in, render-ready flow graph out.
//!
//! The whole graph is recomputed from a complete snapshot whenever the source
//! records change. Node roles and handle wiring depend on the full edge set
//! (entry inference needs to know which steps are never a target), so the
//! output is never patched incrementally.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use traveler_types::{
    DecisionKind, EdgeKind, ProcessStep, Step, StepEdge, TerminalStatus,
};

use crate::overlay::Overlay;

/// Horizontal spacing of the seed layout. A downstream auto-layout pass
/// repositions nodes once the graph is rendered.
pub const NODE_SPACING: f64 = 250.0;

/// Named output handles exposed by decision nodes. Every other node exposes
/// a single unnamed output and input.
pub const HANDLE_PASS: &str = "pass";
pub const HANDLE_FAIL: &str = "fail";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowGraph {
    pub meta: GraphMeta,
    nodes: Vec<FlowNode>,
    edges: Vec<FlowEdge>,
    #[serde(skip)]
    node_index: HashMap<i64, usize>,
    /// Maps step id to a range (start, count) into the sorted `edges` vec.
    /// Edges are sorted by `source` so each node's outgoing edges are contiguous.
    #[serde(skip)]
    adjacency: HashMap<i64, (usize, usize)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphMeta {
    pub title: String,
    pub entry_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowNode {
    pub id: i64,
    pub label: String,
    pub description: Option<String>,
    pub role: NodeRole,
    pub position: Position,
    pub qa: QaFlags,
    /// Mode-specific decoration, attached after the build by the overlay
    /// apply functions. Never affects topology.
    pub overlay: Option<Overlay>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QaFlags {
    pub requires_signoff: bool,
    pub sampling_required: bool,
    pub min_sampling_rate: Option<f64>,
}

/// Resolved role of a step, carrying only the fields relevant to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeRole {
    Task,
    Start,
    Decision { decision: DecisionKind },
    Rework { max_visits: Option<u32> },
    Timer { expected_minutes: Option<f64> },
    Terminal { status: TerminalStatus },
}

impl NodeRole {
    pub fn is_decision(&self) -> bool {
        matches!(self, NodeRole::Decision { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, NodeRole::Terminal { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            NodeRole::Task => "task",
            NodeRole::Start => "start",
            NodeRole::Decision { .. } => "decision",
            NodeRole::Rework { .. } => "rework",
            NodeRole::Timer { .. } => "timer",
            NodeRole::Terminal { .. } => "terminal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowEdge {
    pub id: String,
    pub source: i64,
    pub target: i64,
    pub kind: EdgeKind,
    pub label: Option<String>,
    /// `"pass"` or `"fail"` when the source is a decision node; `None`
    /// otherwise. [`crate::handles::normalize_handles`] maintains this
    /// invariant after interactive edits.
    pub source_handle: Option<String>,
    pub animated: bool,
    pub dashed: bool,
}

// --- Role derivation ---

/// First match wins. A step can be terminal-flagged and carry a visit cap at
/// the same time; terminal must win.
fn derive_role(step: &Step, is_entry: bool) -> NodeRole {
    if let Some(role) = explicit_role(step) {
        return role;
    }
    if step.is_terminal {
        return NodeRole::Terminal {
            status: step.terminal_status.unwrap_or(TerminalStatus::Completed),
        };
    }
    if step.is_decision_point {
        return NodeRole::Decision {
            decision: step.decision_type.unwrap_or(DecisionKind::QaResult),
        };
    }
    if is_entry {
        return NodeRole::Start;
    }
    if step.max_visits.is_some() {
        return NodeRole::Rework {
            max_visits: step.max_visits,
        };
    }
    if step.expected_duration.is_some() {
        return NodeRole::Timer {
            expected_minutes: step.expected_duration,
        };
    }
    NodeRole::Task
}

/// Explicit `step_type` override. `"task"` is the generic default and an
/// unrecognized value is older data; both defer to flag-based derivation.
fn explicit_role(step: &Step) -> Option<NodeRole> {
    match step.step_type.as_deref()? {
        "start" => Some(NodeRole::Start),
        "decision" => Some(NodeRole::Decision {
            decision: step.decision_type.unwrap_or(DecisionKind::QaResult),
        }),
        "rework" => Some(NodeRole::Rework {
            max_visits: step.max_visits,
        }),
        "timer" => Some(NodeRole::Timer {
            expected_minutes: step.expected_duration,
        }),
        "terminal" => Some(NodeRole::Terminal {
            status: step.terminal_status.unwrap_or(TerminalStatus::Completed),
        }),
        _ => None,
    }
}

// --- Edge rendering ---

fn render_edge(edge: &StepEdge, source_is_decision: bool) -> FlowEdge {
    let (label, source_handle, animated, dashed) = match edge.edge_type {
        EdgeKind::Default => (
            source_is_decision.then(|| "Pass".to_string()),
            source_is_decision.then(|| HANDLE_PASS.to_string()),
            false,
            false,
        ),
        EdgeKind::Alternate => (
            Some("Fail".to_string()),
            source_is_decision.then(|| HANDLE_FAIL.to_string()),
            true,
            false,
        ),
        EdgeKind::Escalation => (
            Some("Max Exceeded".to_string()),
            source_is_decision.then(|| HANDLE_PASS.to_string()),
            true,
            true,
        ),
    };

    FlowEdge {
        id: format!("edge-{}", edge.id),
        source: edge.from_step,
        target: edge.to_step,
        kind: edge.edge_type,
        label,
        source_handle,
        animated,
        dashed,
    }
}

impl FlowGraph {
    /// Build a render-ready graph from a complete snapshot of a process's
    /// steps and routing edges. An empty step list yields an empty graph
    /// with a title-only meta, not an error.
    pub fn from_records(title: &str, process_steps: &[ProcessStep], step_edges: &[StepEdge]) -> Self {
        let mut ordered: Vec<&ProcessStep> = process_steps.iter().collect();
        ordered.sort_by_key(|ps| ps.order);

        let incoming: HashSet<i64> = step_edges.iter().map(|e| e.to_step).collect();

        let mut nodes = Vec::with_capacity(ordered.len());
        for (index, ps) in ordered.iter().enumerate() {
            // Older data may lack an explicit entry flag; the first step with
            // no inbound edge is inferred as the start. Only index 0
            // qualifies for the fallback path.
            let is_entry =
                ps.is_entry_point || (index == 0 && !incoming.contains(&ps.step.id));
            nodes.push(FlowNode {
                id: ps.step.id,
                label: ps.step.name.clone(),
                description: ps.step.description.clone(),
                role: derive_role(&ps.step, is_entry),
                position: Position {
                    x: index as f64 * NODE_SPACING,
                    y: 0.0,
                },
                qa: QaFlags {
                    requires_signoff: ps.step.requires_qa_signoff,
                    sampling_required: ps.step.sampling_required,
                    min_sampling_rate: ps.step.min_sampling_rate,
                },
                overlay: None,
            });
        }

        let node_index: HashMap<i64, usize> =
            nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect();

        let mut edges = if step_edges.is_empty() {
            sequential_chain(&nodes)
        } else {
            step_edges
                .iter()
                .map(|e| {
                    if !node_index.contains_key(&e.from_step)
                        || !node_index.contains_key(&e.to_step)
                    {
                        tracing::warn!(
                            edge = e.id,
                            from = e.from_step,
                            to = e.to_step,
                            "Edge references a step outside the process snapshot"
                        );
                    }
                    let source_is_decision = node_index
                        .get(&e.from_step)
                        .is_some_and(|&i| nodes[i].role.is_decision());
                    render_edge(e, source_is_decision)
                })
                .collect()
        };

        // Sort edges by source so each node's outgoing edges form a
        // contiguous slice.
        edges.sort_by_key(|e| e.source);

        let mut adjacency: HashMap<i64, (usize, usize)> = HashMap::new();
        let mut i = 0;
        while i < edges.len() {
            let start = i;
            let source = edges[i].source;
            while i < edges.len() && edges[i].source == source {
                i += 1;
            }
            adjacency.insert(source, (start, i - start));
        }

        let entry_id = nodes
            .iter()
            .find(|n| matches!(n.role, NodeRole::Start))
            .map(|n| n.id);

        FlowGraph {
            meta: GraphMeta {
                title: title.to_string(),
                entry_id,
            },
            nodes,
            edges,
            node_index,
            adjacency,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: i64) -> Option<&FlowNode> {
        self.node_index.get(&id).map(|&i| &self.nodes[i])
    }

    pub fn node_mut(&mut self, id: i64) -> Option<&mut FlowNode> {
        let i = *self.node_index.get(&id)?;
        Some(&mut self.nodes[i])
    }

    /// The node the entry inference resolved as the start, if any.
    pub fn entry_node(&self) -> Option<&FlowNode> {
        self.meta.entry_id.and_then(|id| self.node(id))
    }

    pub fn outgoing_edges(&self, id: i64) -> &[FlowEdge] {
        match self.adjacency.get(&id) {
            Some(&(start, count)) => &self.edges[start..start + count],
            None => &[],
        }
    }

    pub fn nodes(&self) -> &[FlowNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[FlowEdge] {
        &self.edges
    }

    pub fn edges_mut(&mut self) -> &mut [FlowEdge] {
        &mut self.edges
    }

    /// Re-assert the handle invariant after any node or edge change.
    pub fn normalize_handles(&mut self) {
        crate::handles::normalize_handles(&self.nodes, &mut self.edges);
    }
}

/// Legacy processes without explicit routing still render as a connected
/// graph: chain each non-terminal step to its successor in sorted order.
fn sequential_chain(nodes: &[FlowNode]) -> Vec<FlowEdge> {
    nodes
        .windows(2)
        .filter(|pair| !pair[0].role.is_terminal())
        .map(|pair| FlowEdge {
            id: format!("seq-{}-{}", pair[0].id, pair[1].id),
            source: pair[0].id,
            target: pair[1].id,
            kind: EdgeKind::Default,
            label: None,
            source_handle: pair[0]
                .role
                .is_decision()
                .then(|| HANDLE_PASS.to_string()),
            animated: false,
            dashed: false,
        })
        .collect()
}
