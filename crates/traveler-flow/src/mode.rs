//! Per-mode rendering configuration.
//!
//! Each flow mode resolves to its config through a single exhaustive match,
//! so adding a mode without a config entry is a compile error rather than a
//! runtime gap.

use serde::{Deserialize, Serialize};

use crate::overlay::OverlayKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowMode {
    /// Read-only process view.
    View,
    /// Interactive flow editor.
    Edit,
    /// Work-order tracking with part counts per step.
    WorkOrder,
    /// Process evaluation with bottleneck metrics.
    Evaluation,
    /// Rework tracking with visit counts against caps.
    Rework,
    /// QA signoff checkpoints.
    Quality,
    /// Sampling-rule coverage indicators.
    Sampling,
    /// Live shop-floor monitor.
    Monitor,
    /// Compact preview used in pickers and lists.
    Thumbnail,
}

impl FlowMode {
    pub const ALL: [FlowMode; 9] = [
        FlowMode::View,
        FlowMode::Edit,
        FlowMode::WorkOrder,
        FlowMode::Evaluation,
        FlowMode::Rework,
        FlowMode::Quality,
        FlowMode::Sampling,
        FlowMode::Monitor,
        FlowMode::Thumbnail,
    ];

    pub fn config(self) -> ModeConfig {
        match self {
            FlowMode::View => ModeConfig {
                interactive: false,
                show_edge_labels: true,
                animate_edges: false,
                fit_view: true,
                overlay: None,
            },
            FlowMode::Edit => ModeConfig {
                interactive: true,
                show_edge_labels: true,
                animate_edges: false,
                fit_view: false,
                overlay: None,
            },
            FlowMode::WorkOrder => ModeConfig {
                interactive: false,
                show_edge_labels: true,
                animate_edges: true,
                fit_view: true,
                overlay: Some(OverlayKind::PartCount),
            },
            FlowMode::Evaluation => ModeConfig {
                interactive: false,
                show_edge_labels: false,
                animate_edges: false,
                fit_view: true,
                overlay: Some(OverlayKind::Bottleneck),
            },
            FlowMode::Rework => ModeConfig {
                interactive: false,
                show_edge_labels: true,
                animate_edges: true,
                fit_view: true,
                overlay: Some(OverlayKind::Rework),
            },
            FlowMode::Quality => ModeConfig {
                interactive: false,
                show_edge_labels: true,
                animate_edges: false,
                fit_view: true,
                overlay: Some(OverlayKind::Quality),
            },
            FlowMode::Sampling => ModeConfig {
                interactive: false,
                show_edge_labels: false,
                animate_edges: false,
                fit_view: true,
                overlay: Some(OverlayKind::Quality),
            },
            FlowMode::Monitor => ModeConfig {
                interactive: false,
                show_edge_labels: false,
                animate_edges: true,
                fit_view: true,
                overlay: Some(OverlayKind::PartCount),
            },
            FlowMode::Thumbnail => ModeConfig {
                interactive: false,
                show_edge_labels: false,
                animate_edges: false,
                fit_view: true,
                overlay: None,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeConfig {
    /// Whether the canvas accepts node/edge edits.
    pub interactive: bool,
    pub show_edge_labels: bool,
    pub animate_edges: bool,
    /// Auto-fit the viewport to the graph on load.
    pub fit_view: bool,
    pub overlay: Option<OverlayKind>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mode_resolves_a_config() {
        for mode in FlowMode::ALL {
            // The match in config() is exhaustive; this keeps ALL honest.
            let _ = mode.config();
        }
    }

    #[test]
    fn only_edit_mode_is_interactive() {
        for mode in FlowMode::ALL {
            assert_eq!(mode.config().interactive, mode == FlowMode::Edit);
        }
    }

    #[test]
    fn evaluation_mode_uses_bottleneck_overlay() {
        assert_eq!(
            FlowMode::Evaluation.config().overlay,
            Some(OverlayKind::Bottleneck)
        );
    }

    #[test]
    fn thumbnail_mode_is_minimal() {
        let config = FlowMode::Thumbnail.config();
        assert!(!config.show_edge_labels);
        assert!(!config.animate_edges);
        assert!(config.overlay.is_none());
    }

    #[test]
    fn mode_serializes_to_snake_case() {
        assert_eq!(
            serde_json::to_string(&FlowMode::WorkOrder).unwrap(),
            "\"work_order\""
        );
        let mode: FlowMode = serde_json::from_str("\"evaluation\"").unwrap();
        assert_eq!(mode, FlowMode::Evaluation);
    }
}
