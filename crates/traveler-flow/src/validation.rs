//! Flow lint rules and diagnostics.
//!
//! Checks the structural invariants of a built graph. Call [`validate`] for
//! advisory diagnostics or [`validate_or_raise`] to fail on the first
//! `Error`-severity issue. The builder itself never rejects malformed input;
//! these rules are how data-integrity problems reach the user.

use std::collections::{HashSet, VecDeque};

use traveler_types::{Diagnostic, EdgeKind, Severity, TravelerError};

use crate::graph::{FlowGraph, NodeRole};

pub trait LintRule {
    fn name(&self) -> &str;
    fn apply(&self, graph: &FlowGraph) -> Vec<Diagnostic>;
}

struct EdgeEndpointsExistRule;
impl LintRule for EdgeEndpointsExistRule {
    fn name(&self) -> &str {
        "edge_endpoints_exist"
    }
    fn apply(&self, graph: &FlowGraph) -> Vec<Diagnostic> {
        graph
            .edges()
            .iter()
            .filter(|e| graph.node(e.source).is_none() || graph.node(e.target).is_none())
            .map(|e| Diagnostic {
                rule: self.name().into(),
                severity: Severity::Error,
                message: format!(
                    "Edge {} -> {} references a step that is not in this process",
                    e.source, e.target
                ),
                subject_id: None,
                edge: Some((e.source, e.target)),
                fix: Some("Remove the edge or add the missing step to the process".into()),
            })
            .collect()
    }
}

struct TerminalNoOutgoingRule;
impl LintRule for TerminalNoOutgoingRule {
    fn name(&self) -> &str {
        "terminal_no_outgoing"
    }
    fn apply(&self, graph: &FlowGraph) -> Vec<Diagnostic> {
        graph
            .nodes()
            .iter()
            .filter(|n| n.role.is_terminal())
            .filter(|n| !graph.outgoing_edges(n.id).is_empty())
            .map(|n| Diagnostic {
                rule: self.name().into(),
                severity: Severity::Error,
                message: format!("Terminal step '{}' has outgoing edges", n.label),
                subject_id: Some(n.id),
                edge: None,
                fix: Some(format!("Remove outgoing edges from '{}'", n.label)),
            })
            .collect()
    }
}

struct DecisionHasFailBranchRule;
impl LintRule for DecisionHasFailBranchRule {
    fn name(&self) -> &str {
        "decision_has_fail_branch"
    }
    fn apply(&self, graph: &FlowGraph) -> Vec<Diagnostic> {
        graph
            .nodes()
            .iter()
            .filter(|n| n.role.is_decision())
            .filter(|n| {
                !graph
                    .outgoing_edges(n.id)
                    .iter()
                    .any(|e| e.kind == EdgeKind::Alternate)
            })
            .map(|n| Diagnostic {
                rule: self.name().into(),
                severity: Severity::Warning,
                message: format!(
                    "Decision step '{}' has no fail transition; rejected parts have nowhere to go",
                    n.label
                ),
                subject_id: Some(n.id),
                edge: None,
                fix: Some("Add an alternate edge for the fail outcome".into()),
            })
            .collect()
    }
}

struct EntryPointExistsRule;
impl LintRule for EntryPointExistsRule {
    fn name(&self) -> &str {
        "entry_point_exists"
    }
    fn apply(&self, graph: &FlowGraph) -> Vec<Diagnostic> {
        if graph.is_empty() || graph.entry_node().is_some() {
            return vec![];
        }
        vec![Diagnostic {
            rule: self.name().into(),
            severity: Severity::Warning,
            message: "Process has no entry point; parts cannot be routed into it".into(),
            subject_id: None,
            edge: None,
            fix: Some("Mark one step as the entry point".into()),
        }]
    }
}

struct ReworkHasEscalationRule;
impl LintRule for ReworkHasEscalationRule {
    fn name(&self) -> &str {
        "rework_has_escalation"
    }
    fn apply(&self, graph: &FlowGraph) -> Vec<Diagnostic> {
        graph
            .nodes()
            .iter()
            .filter(|n| matches!(n.role, NodeRole::Rework { max_visits: Some(_) }))
            .filter(|n| {
                !graph
                    .outgoing_edges(n.id)
                    .iter()
                    .any(|e| e.kind == EdgeKind::Escalation)
            })
            .map(|n| Diagnostic {
                rule: self.name().into(),
                severity: Severity::Warning,
                message: format!(
                    "Rework step '{}' has a visit cap but no escalation transition",
                    n.label
                ),
                subject_id: Some(n.id),
                edge: None,
                fix: Some("Add an escalation edge for parts that exceed the cap".into()),
            })
            .collect()
    }
}

struct UnreachableStepsRule;
impl LintRule for UnreachableStepsRule {
    fn name(&self) -> &str {
        "unreachable_steps"
    }
    fn apply(&self, graph: &FlowGraph) -> Vec<Diagnostic> {
        let entry = match graph.entry_node() {
            Some(n) => n.id,
            None => return vec![], // EntryPointExistsRule reports this
        };

        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(entry);
        queue.push_back(entry);
        while let Some(current) = queue.pop_front() {
            for edge in graph.outgoing_edges(current) {
                if visited.insert(edge.target) {
                    queue.push_back(edge.target);
                }
            }
        }

        graph
            .nodes()
            .iter()
            .filter(|n| !visited.contains(&n.id))
            .map(|n| Diagnostic {
                rule: self.name().into(),
                severity: Severity::Warning,
                message: format!("Step '{}' is not reachable from the entry point", n.label),
                subject_id: Some(n.id),
                edge: None,
                fix: Some(format!("Add a transition leading to '{}' or remove it", n.label)),
            })
            .collect()
    }
}

/// Run all built-in lint rules and return collected diagnostics.
pub fn validate(graph: &FlowGraph) -> Vec<Diagnostic> {
    let rules: Vec<Box<dyn LintRule>> = vec![
        Box::new(EdgeEndpointsExistRule),
        Box::new(TerminalNoOutgoingRule),
        Box::new(DecisionHasFailBranchRule),
        Box::new(EntryPointExistsRule),
        Box::new(ReworkHasEscalationRule),
        Box::new(UnreachableStepsRule),
    ];

    let mut diagnostics = Vec::new();
    for rule in &rules {
        diagnostics.extend(rule.apply(graph));
    }
    diagnostics
}

/// Run all lint rules; return `Err` if any `Error`-severity diagnostic found.
pub fn validate_or_raise(graph: &FlowGraph) -> traveler_types::Result<Vec<Diagnostic>> {
    let diagnostics = validate(graph);
    if let Some(summary) = Diagnostic::error_summary(&diagnostics) {
        return Err(TravelerError::Validation(summary));
    }
    Ok(diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use traveler_types::{ProcessStep, Step, StepEdge, TerminalStatus};

    fn step(id: i64, name: &str) -> Step {
        Step {
            id,
            name: name.into(),
            description: None,
            step_type: None,
            is_decision_point: false,
            decision_type: None,
            is_terminal: false,
            terminal_status: None,
            max_visits: None,
            expected_duration: None,
            requires_qa_signoff: false,
            sampling_required: false,
            min_sampling_rate: None,
        }
    }

    fn ps(order: i64, step: Step) -> ProcessStep {
        ProcessStep {
            id: step.id + 1000,
            order,
            is_entry_point: false,
            step,
        }
    }

    fn edge(id: i64, from: i64, to: i64, kind: EdgeKind) -> StepEdge {
        StepEdge {
            id,
            from_step: from,
            to_step: to,
            edge_type: kind,
            condition_measurement: None,
            condition_operator: None,
            condition_value: None,
        }
    }

    fn has(diags: &[Diagnostic], rule: &str, severity: Severity) -> bool {
        diags.iter().any(|d| d.rule == rule && d.severity == severity)
    }

    #[test]
    fn clean_linear_process_passes() {
        let mut ship = step(3, "Ship");
        ship.is_terminal = true;
        ship.terminal_status = Some(TerminalStatus::Shipped);
        let steps = vec![ps(1, step(1, "Intake")), ps(2, step(2, "Machine")), ps(3, ship)];
        let edges = vec![
            edge(1, 1, 2, EdgeKind::Default),
            edge(2, 2, 3, EdgeKind::Default),
        ];
        let graph = FlowGraph::from_records("P", &steps, &edges);
        let diags = validate_or_raise(&graph).expect("no errors expected");
        assert!(diags.is_empty(), "expected a clean bill, got: {diags:?}");
    }

    #[test]
    fn dangling_edge_reported_as_error() {
        let steps = vec![ps(1, step(1, "A"))];
        let edges = vec![edge(1, 1, 999, EdgeKind::Default)];
        let graph = FlowGraph::from_records("P", &steps, &edges);
        let diags = validate(&graph);
        assert!(has(&diags, "edge_endpoints_exist", Severity::Error));
        assert!(validate_or_raise(&graph).is_err());
    }

    #[test]
    fn terminal_with_outgoing_edge_reported() {
        let mut done = step(1, "Done");
        done.is_terminal = true;
        let steps = vec![ps(1, done), ps(2, step(2, "After"))];
        let edges = vec![edge(1, 1, 2, EdgeKind::Default)];
        let graph = FlowGraph::from_records("P", &steps, &edges);
        let diags = validate(&graph);
        assert!(has(&diags, "terminal_no_outgoing", Severity::Error));
    }

    #[test]
    fn decision_without_fail_branch_warns() {
        let mut inspect = step(1, "Inspect");
        inspect.is_decision_point = true;
        let steps = vec![ps(1, inspect), ps(2, step(2, "Next"))];
        let edges = vec![edge(1, 1, 2, EdgeKind::Default)];
        let graph = FlowGraph::from_records("P", &steps, &edges);
        let diags = validate(&graph);
        assert!(has(&diags, "decision_has_fail_branch", Severity::Warning));
        // Warnings never block.
        assert!(validate_or_raise(&graph).is_ok());
    }

    #[test]
    fn missing_entry_point_warns() {
        // A cycle gives every step an inbound edge, so nothing is inferred.
        let steps = vec![ps(1, step(1, "A")), ps(2, step(2, "B"))];
        let edges = vec![
            edge(1, 1, 2, EdgeKind::Default),
            edge(2, 2, 1, EdgeKind::Default),
        ];
        let graph = FlowGraph::from_records("P", &steps, &edges);
        let diags = validate(&graph);
        assert!(has(&diags, "entry_point_exists", Severity::Warning));
    }

    #[test]
    fn empty_graph_produces_no_diagnostics() {
        let graph = FlowGraph::from_records("P", &[], &[]);
        assert!(validate(&graph).is_empty());
    }

    #[test]
    fn capped_rework_without_escalation_warns() {
        let mut rework = step(2, "Touch Up");
        rework.max_visits = Some(2);
        let steps = vec![ps(1, step(1, "A")), ps(2, rework)];
        let edges = vec![
            edge(1, 1, 2, EdgeKind::Default),
            edge(2, 2, 1, EdgeKind::Default),
        ];
        let graph = FlowGraph::from_records("P", &steps, &edges);
        let diags = validate(&graph);
        assert!(has(&diags, "rework_has_escalation", Severity::Warning));
    }

    #[test]
    fn capped_rework_with_escalation_clean() {
        let mut rework = step(2, "Touch Up");
        rework.max_visits = Some(2);
        let mut scrap = step(3, "Scrap");
        scrap.is_terminal = true;
        scrap.terminal_status = Some(TerminalStatus::Scrapped);
        let steps = vec![ps(1, step(1, "A")), ps(2, rework), ps(3, scrap)];
        let edges = vec![
            edge(1, 1, 2, EdgeKind::Default),
            edge(2, 2, 1, EdgeKind::Default),
            edge(3, 2, 3, EdgeKind::Escalation),
        ];
        let graph = FlowGraph::from_records("P", &steps, &edges);
        let diags = validate(&graph);
        assert!(!has(&diags, "rework_has_escalation", Severity::Warning));
    }

    #[test]
    fn disconnected_step_warns_not_errors() {
        let steps = vec![
            ps(1, step(1, "A")),
            ps(2, step(2, "B")),
            ps(3, step(3, "Orphan")),
        ];
        let edges = vec![edge(1, 1, 2, EdgeKind::Default)];
        let graph = FlowGraph::from_records("P", &steps, &edges);
        let diags = validate(&graph);
        let orphan: Vec<_> = diags
            .iter()
            .filter(|d| d.rule == "unreachable_steps")
            .collect();
        assert_eq!(orphan.len(), 1);
        assert_eq!(orphan[0].severity, Severity::Warning);
        assert_eq!(orphan[0].subject_id, Some(3));
    }
}
