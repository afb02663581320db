use crate::config::LayoutConfig;
use crate::library::{Graph, Metric};

use super::super::adjacency::AdjacencyIndex;
use super::super::highlight::{HoverContext, InteractionController, RenderState};
use super::super::metric::{NodeStyle, node_styles};
use super::super::physics::Simulation;
use super::super::{RenderGraph, ViewModel, ViewScratch};

impl RenderGraph {
    pub(in crate::app) fn build(
        graph: &Graph,
        metric: Metric,
        config: LayoutConfig,
        revision: u64,
    ) -> Self {
        let styles = node_styles(graph, metric);
        let keys = graph.nodes.iter().map(|node| node.key()).collect::<Vec<_>>();
        let links = graph
            .edges
            .iter()
            .map(|edge| (edge.source, edge.target))
            .collect::<Vec<_>>();
        let charges = styles.iter().map(|style| style.charge).collect();

        Self {
            revision,
            simulation: Simulation::new(&keys, charges, links, config),
            adjacency: AdjacencyIndex::build(&graph.edges),
            weights: styles.iter().map(|style| style.weight).collect(),
            radii: styles.iter().map(|style| style.radius).collect(),
            view_scratch: ViewScratch::default(),
        }
    }

    fn restyle(&mut self, styles: &[NodeStyle]) {
        self.weights = styles.iter().map(|style| style.weight).collect();
        self.radii = styles.iter().map(|style| style.radius).collect();
        let charges = styles.iter().map(|style| style.charge).collect::<Vec<_>>();
        self.simulation.set_charges(&charges);
    }
}

impl ViewModel {
    pub(in crate::app) fn new(
        graph: Graph,
        metric: Metric,
        config: LayoutConfig,
        revision: u64,
    ) -> Self {
        let cache = RenderGraph::build(&graph, metric, config, revision);
        let render_state = RenderState::new(graph.node_count(), graph.edge_count());

        Self {
            auto_stop_secs: config.auto_stop_secs.unwrap_or(10.0) as f32,
            auto_stop_enabled: config.auto_stop_secs.is_some(),
            graph,
            metric,
            config,
            cache,
            controller: InteractionController::new(revision),
            render_state,
            pan: eframe::egui::Vec2::ZERO,
            zoom: 1.0,
            dragging: None,
            start_pending: true,
            fps_current: 0.0,
            fps_samples: Default::default(),
        }
    }

    /// Warm restart under another metric: sizes and charges change,
    /// positions stay.
    pub(in crate::app) fn set_metric(&mut self, metric: Metric, now: f64) {
        if metric == self.metric {
            return;
        }

        self.cache.simulation.stop();
        self.metric = metric;
        self.cache.restyle(&node_styles(&self.graph, metric));
        self.refresh_hover();
        self.cache.simulation.start(now);
        log::info!("metric switched to {metric}");
    }

    /// Pushes edited layout knobs into the engine and warm-restarts it.
    pub(in crate::app) fn apply_config(&mut self, now: f64) {
        self.config.auto_stop_secs = self
            .auto_stop_enabled
            .then_some(self.auto_stop_secs.max(0.5) as f64);
        self.cache.simulation.set_config(self.config);
        self.refresh_hover();
        self.cache.simulation.start(now);
    }

    pub(in crate::app) fn refresh_hover(&mut self) {
        let Some(hovered) = self.controller.hovered() else {
            return;
        };
        let context = HoverContext {
            graph: &self.graph,
            adjacency: &self.cache.adjacency,
            radii: &self.cache.radii,
            positions: self.cache.simulation.positions(),
            config: &self.config,
        };
        self.controller
            .on_hover_enter(self.controller.handle(hovered), &context, &mut self.render_state);
    }
}
