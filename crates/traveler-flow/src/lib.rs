//! Render-ready process flow graphs.
//!
//! This crate turns raw step/edge records into a typed graph for the flow
//! canvas: node-role derivation, handle wiring, lint rules, per-mode
//! configuration, and overlay decoration. Everything is a pure synchronous
//! pass over a complete snapshot; the graph is rebuilt, never patched.

pub mod bottleneck;
pub mod graph;
pub mod handles;
pub mod mode;
pub mod overlay;
pub mod validation;

pub use bottleneck::{severity, severity_by_step, BOTTLENECK_THRESHOLD, SEVERE_THRESHOLD};
pub use graph::{
    FlowEdge, FlowGraph, FlowNode, GraphMeta, NodeRole, Position, QaFlags, HANDLE_FAIL,
    HANDLE_PASS, NODE_SPACING,
};
pub use handles::normalize_handles;
pub use mode::{FlowMode, ModeConfig};
pub use overlay::{
    apply_bottleneck_metrics, apply_part_counts, apply_quality_flags, apply_visit_counts, Overlay,
    OverlayKind,
};
pub use validation::{validate, validate_or_raise, LintRule};
