//! End-to-end tests for the flow core: records -> build -> normalize ->
//! lint -> overlay, the way the presentation layer drives it.

use std::collections::HashMap;

use traveler_flow::{
    apply_bottleneck_metrics, apply_visit_counts, validate, validate_or_raise, FlowGraph,
    FlowMode, NodeRole, Overlay, OverlayKind, HANDLE_FAIL, HANDLE_PASS,
};
use traveler_types::{
    DecisionKind, EdgeKind, ProcessStep, Severity, Step, StepEdge, StepMetrics, TerminalStatus,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

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

/// A realistic machining process: intake -> machine -> inspect, with a
/// capped rework loop, escalation to scrap, and shipment on pass.
fn valve_body_records() -> (Vec<ProcessStep>, Vec<StepEdge>) {
    let intake = step(1, "Intake");

    let mut machine = step(2, "CNC Machine");
    machine.expected_duration = Some(45.0);

    let mut inspect = step(3, "Final Inspect");
    inspect.is_decision_point = true;
    inspect.decision_type = Some(DecisionKind::QaResult);
    inspect.requires_qa_signoff = true;
    inspect.sampling_required = true;

    let mut rework = step(4, "Rework");
    rework.max_visits = Some(2);

    let mut scrap = step(5, "Scrap");
    scrap.is_terminal = true;
    scrap.terminal_status = Some(TerminalStatus::Scrapped);

    let mut ship = step(6, "Ship");
    ship.is_terminal = true;
    ship.terminal_status = Some(TerminalStatus::Shipped);

    let steps = vec![
        ps(10, intake),
        ps(20, machine),
        ps(30, inspect),
        ps(40, rework),
        ps(50, scrap),
        ps(60, ship),
    ];
    let edges = vec![
        edge(1, 1, 2, EdgeKind::Default),
        edge(2, 2, 3, EdgeKind::Default),
        edge(3, 3, 6, EdgeKind::Default),
        edge(4, 3, 4, EdgeKind::Alternate),
        edge(5, 4, 2, EdgeKind::Default),
        edge(6, 4, 5, EdgeKind::Escalation),
    ];
    (steps, edges)
}

// ---------------------------------------------------------------------------
// Full pipeline
// ---------------------------------------------------------------------------

#[test]
fn realistic_process_builds_clean() {
    let (steps, edges) = valve_body_records();
    let mut graph = FlowGraph::from_records("Valve Body", &steps, &edges);
    graph.normalize_handles();

    assert_eq!(graph.node(1).unwrap().role, NodeRole::Start);
    assert_eq!(graph.node(2).unwrap().role.kind(), "timer");
    assert!(graph.node(3).unwrap().role.is_decision());
    assert_eq!(graph.node(4).unwrap().role.kind(), "rework");
    assert!(graph.node(5).unwrap().role.is_terminal());
    assert!(graph.node(6).unwrap().role.is_terminal());

    let diags = validate_or_raise(&graph).expect("no structural errors");
    assert!(
        diags.is_empty(),
        "expected no warnings either, got: {diags:?}"
    );
}

#[test]
fn decision_branch_handles_survive_normalization() {
    let (steps, edges) = valve_body_records();
    let mut graph = FlowGraph::from_records("Valve Body", &steps, &edges);
    graph.normalize_handles();

    let outgoing = graph.outgoing_edges(3);
    assert_eq!(outgoing.len(), 2);
    let pass = outgoing.iter().find(|e| e.kind == EdgeKind::Default).unwrap();
    let fail = outgoing
        .iter()
        .find(|e| e.kind == EdgeKind::Alternate)
        .unwrap();
    assert_eq!(pass.source_handle.as_deref(), Some(HANDLE_PASS));
    assert_eq!(pass.label.as_deref(), Some("Pass"));
    assert_eq!(fail.source_handle.as_deref(), Some(HANDLE_FAIL));
    assert_eq!(fail.label.as_deref(), Some("Fail"));

    // Non-decision sources carry no handles anywhere in the graph.
    for e in graph.edges() {
        if !graph.node(e.source).is_some_and(|n| n.role.is_decision()) {
            assert!(e.source_handle.is_none(), "unexpected handle on {}", e.id);
        }
    }
}

#[test]
fn role_toggle_then_normalize_repairs_wiring() {
    let (mut steps, edges) = valve_body_records();
    // The inspect step stops being a decision point; its pass/fail edges
    // survive in the stored routing.
    steps[2].step.is_decision_point = false;
    steps[2].step.decision_type = None;

    let mut graph = FlowGraph::from_records("Valve Body", &steps, &edges);
    graph.normalize_handles();

    for e in graph.outgoing_edges(3) {
        assert!(e.source_handle.is_none());
    }
}

#[test]
fn evaluation_mode_overlay_path() {
    let (steps, edges) = valve_body_records();
    let mut graph = FlowGraph::from_records("Valve Body", &steps, &edges);

    assert_eq!(
        FlowMode::Evaluation.config().overlay,
        Some(OverlayKind::Bottleneck)
    );

    let mut metrics = HashMap::new();
    for (id, dwell, throughput) in [(1, 5.0, 20.0), (2, 45.0, 4.0), (3, 12.0, 18.0)] {
        metrics.insert(
            id,
            StepMetrics {
                avg_dwell_minutes: dwell,
                avg_transition_minutes: 2.0,
                throughput_per_hour: throughput,
                pass_rate: 0.95,
                rework_rate: 0.05,
                total_parts: 400,
                estimated: false,
            },
        );
    }
    apply_bottleneck_metrics(&mut graph, &metrics);

    match graph.node(2).unwrap().overlay {
        Some(Overlay::Bottleneck { flagged, .. }) => assert!(flagged),
        ref other => panic!("expected bottleneck overlay on the slow step, got {other:?}"),
    }
    // Steps without metrics stay undecorated.
    assert!(graph.node(4).unwrap().overlay.is_none());
}

#[test]
fn rework_mode_overlay_path() {
    let (steps, edges) = valve_body_records();
    let mut graph = FlowGraph::from_records("Valve Body", &steps, &edges);

    let mut visits = HashMap::new();
    visits.insert(4, 2u32);
    apply_visit_counts(&mut graph, &visits);

    assert_eq!(
        graph.node(4).unwrap().overlay,
        Some(Overlay::Rework {
            visits: 2,
            max_visits: Some(2)
        })
    );
}

#[test]
fn legacy_process_without_routing_still_renders_connected() {
    let mut done = step(3, "Done");
    done.is_terminal = true;
    let steps = vec![ps(1, step(1, "Saw")), ps(2, step(2, "Weld")), ps(3, done)];
    let graph = FlowGraph::from_records("Legacy", &steps, &[]);

    let pairs: Vec<(i64, i64)> = graph.edges().iter().map(|e| (e.source, e.target)).collect();
    assert_eq!(pairs, vec![(1, 2), (2, 3)]);
    assert!(validate_or_raise(&graph).is_ok());
}

#[test]
fn orphaned_island_surfaces_as_warning_only() {
    let (mut steps, edges) = valve_body_records();
    steps.push(ps(70, step(7, "Forgotten Deburr")));

    let graph = FlowGraph::from_records("Valve Body", &steps, &edges);
    let diags = validate(&graph);
    let orphan: Vec<_> = diags
        .iter()
        .filter(|d| d.rule == "unreachable_steps")
        .collect();
    assert_eq!(orphan.len(), 1);
    assert_eq!(orphan[0].severity, Severity::Warning);
    // Advisory only: a save is not blocked.
    assert!(validate_or_raise(&graph).is_ok());
}

#[test]
fn graph_round_trips_to_presentation_json() {
    let (steps, edges) = valve_body_records();
    let mut graph = FlowGraph::from_records("Valve Body", &steps, &edges);
    graph.normalize_handles();

    let json = serde_json::to_value(&graph).unwrap();
    assert_eq!(json["meta"]["title"], "Valve Body");
    assert_eq!(json["meta"]["entry_id"], 1);
    assert_eq!(json["nodes"].as_array().unwrap().len(), 6);
    assert_eq!(json["edges"].as_array().unwrap().len(), 6);
    let kinds: Vec<&str> = json["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["role"]["kind"].as_str().unwrap())
        .collect();
    assert_eq!(
        kinds,
        vec!["start", "timer", "decision", "rework", "terminal", "terminal"]
    );
}
