mod labels;

use eframe::egui::Vec2;

use crate::config::LayoutConfig;
use crate::library::Graph;

use self::labels::{connected_labels, tooltip_for};
use super::adjacency::AdjacencyIndex;

/// Identifies a node within one loaded graph revision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) struct NodeHandle {
    pub revision: u64,
    pub index: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) struct NodeLabel {
    pub node: usize,
    pub text: String,
    pub offset: Vec2,
    /// World position, refreshed on every tick.
    pub position: Vec2,
}

#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) struct Tooltip {
    pub node: usize,
    pub text: String,
    pub offset: Vec2,
    pub position: Vec2,
}

/// Highlight and visibility state for one graph. Replaced wholesale on
/// reload.
#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) struct RenderState {
    pub node_opacity: Vec<f32>,
    pub edge_opacity: Vec<f32>,
    pub labels: Vec<NodeLabel>,
    pub tooltip: Option<Tooltip>,
}

impl RenderState {
    pub(in crate::app) fn new(node_count: usize, edge_count: usize) -> Self {
        Self {
            node_opacity: vec![1.0; node_count],
            edge_opacity: vec![1.0; edge_count],
            labels: Vec::new(),
            tooltip: None,
        }
    }

    fn reset(&mut self) {
        self.node_opacity.fill(1.0);
        self.edge_opacity.fill(1.0);
        self.labels.clear();
        self.tooltip = None;
    }
}

/// Everything the controller reads to recompute a highlight.
pub(in crate::app) struct HoverContext<'a> {
    pub graph: &'a Graph,
    pub adjacency: &'a AdjacencyIndex,
    pub radii: &'a [f32],
    pub positions: &'a [Vec2],
    pub config: &'a LayoutConfig,
}

pub(in crate::app) struct InteractionController {
    revision: u64,
    hovered: Option<usize>,
}

impl InteractionController {
    pub(in crate::app) fn new(revision: u64) -> Self {
        Self {
            revision,
            hovered: None,
        }
    }

    pub(in crate::app) fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub(in crate::app) fn handle(&self, index: usize) -> NodeHandle {
        NodeHandle {
            revision: self.revision,
            index,
        }
    }

    fn resolve(&self, handle: NodeHandle, node_count: usize) -> Option<usize> {
        (handle.revision == self.revision && handle.index < node_count).then_some(handle.index)
    }

    /// Recomputes every node/edge opacity and the transient labels from
    /// scratch, so a previous hover never leaks into this one.
    pub(in crate::app) fn on_hover_enter(
        &mut self,
        handle: NodeHandle,
        context: &HoverContext<'_>,
        state: &mut RenderState,
    ) {
        let Some(hovered) = self.resolve(handle, context.graph.node_count()) else {
            return;
        };

        let dimmed = context.config.dimmed_opacity;
        self.hovered = Some(hovered);

        state.node_opacity.resize(context.graph.node_count(), 1.0);
        for (other, opacity) in state.node_opacity.iter_mut().enumerate() {
            *opacity = if context.adjacency.is_connected(hovered, other) {
                1.0
            } else {
                dimmed
            };
        }

        state.edge_opacity.resize(context.graph.edge_count(), 1.0);
        for (edge, opacity) in context.graph.edges.iter().zip(state.edge_opacity.iter_mut()) {
            *opacity = if edge.touches(hovered) { 1.0 } else { dimmed };
        }

        state.labels = connected_labels(hovered, context);
        state.tooltip = Some(tooltip_for(hovered, context));
    }

    /// Clears the highlight when leaving the hovered node. Leaving a node
    /// that is no longer hovered is a no-op: a later enter already replaced
    /// its state.
    pub(in crate::app) fn on_hover_exit(&mut self, handle: NodeHandle, state: &mut RenderState) {
        if handle.revision != self.revision || self.hovered != Some(handle.index) {
            return;
        }
        self.hovered = None;
        state.reset();
    }

    /// Connectivity does not change between ticks; only anchors move.
    pub(in crate::app) fn on_tick(&self, positions: &[Vec2], state: &mut RenderState) {
        if self.hovered.is_none() {
            return;
        }

        for label in &mut state.labels {
            if let Some(&anchor) = positions.get(label.node) {
                label.position = anchor + label.offset;
            }
        }
        if let Some(tooltip) = &mut state.tooltip
            && let Some(&anchor) = positions.get(tooltip.node)
        {
            tooltip.position = anchor + tooltip.offset;
        }
    }
}
