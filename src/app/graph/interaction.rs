use eframe::egui::{self, Pos2, Rect, Ui, Vec2};

use super::super::ViewModel;
use super::super::highlight::HoverContext;
use super::super::render_utils::{circle_visible, screen_to_world};

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.1, 8.0);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    /// Secondary and middle drags always pan; a primary drag pans only when
    /// it did not grab a node.
    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        let background_drag =
            self.dragging.is_none() && response.dragged_by(egui::PointerButton::Primary);
        if background_drag
            || response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    /// Drag start pins the grabbed node, every drag frame moves it and
    /// reheats the layout, drag end releases it.
    pub(in crate::app) fn handle_node_drag(
        &mut self,
        rect: Rect,
        response: &egui::Response,
        press_origin: Option<Pos2>,
        now: f64,
    ) {
        if response.drag_started_by(egui::PointerButton::Primary) {
            self.begin_node_drag(press_origin);
        }

        let Some(index) = self.dragging else {
            return;
        };

        if response.dragged_by(egui::PointerButton::Primary)
            && let Some(pointer) = response.interact_pointer_pos()
        {
            self.drag_node_to(index, screen_to_world(rect, self.pan, self.zoom, pointer), now);
        }

        if response.drag_stopped() {
            self.end_node_drag();
        }
    }

    /// Grabs the node under the press point, not under the pointer as it
    /// is once the drag threshold has been crossed.
    pub(in crate::app) fn begin_node_drag(&mut self, press_origin: Option<Pos2>) {
        let scratch = &self.cache.view_scratch;
        self.dragging = Self::hovered_index(
            press_origin,
            &scratch.visible_indices,
            &scratch.screen_positions,
            &scratch.screen_radii,
        );
    }

    pub(in crate::app) fn drag_node_to(&mut self, index: usize, world: Vec2, now: f64) {
        if self.cache.simulation.pin(index, world) {
            self.cache.simulation.resume(now);
            self.controller
                .on_tick(self.cache.simulation.positions(), &mut self.render_state);
        }
    }

    pub(in crate::app) fn end_node_drag(&mut self) {
        if let Some(index) = self.dragging.take() {
            self.cache.simulation.release(index);
        }
    }

    /// Turns the node under the pointer into exit/enter transitions.
    pub(in crate::app) fn sync_hover(&mut self, next: Option<usize>) {
        let current = self.controller.hovered();
        if current == next {
            return;
        }

        if let Some(previous) = current {
            self.controller
                .on_hover_exit(self.controller.handle(previous), &mut self.render_state);
        }
        if let Some(index) = next {
            let context = HoverContext {
                graph: &self.graph,
                adjacency: &self.cache.adjacency,
                radii: &self.cache.radii,
                positions: self.cache.simulation.positions(),
                config: &self.config,
            };
            self.controller
                .on_hover_enter(self.controller.handle(index), &context, &mut self.render_state);
        }
    }

    pub(in crate::app) fn reset_view(&mut self) {
        self.pan = Vec2::ZERO;
        self.zoom = 1.0;
    }

    pub(in crate::app) fn visible_indices_into(
        rect: Rect,
        screen_positions: &[Pos2],
        screen_radii: &[f32],
        visible_indices: &mut Vec<usize>,
    ) {
        visible_indices.clear();
        visible_indices.extend(
            (0..screen_positions.len())
                .filter(|&index| circle_visible(rect, screen_positions[index], screen_radii[index])),
        );
    }

    /// Topmost node under the pointer. Later nodes are painted over earlier
    /// ones, so ties go to the higher index.
    pub(in crate::app) fn hovered_index(
        pointer: Option<Pos2>,
        visible_indices: &[usize],
        screen_positions: &[Pos2],
        screen_radii: &[f32],
    ) -> Option<usize> {
        let pointer = pointer?;
        visible_indices
            .iter()
            .rev()
            .copied()
            .find(|&index| screen_positions[index].distance(pointer) <= screen_radii[index])
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;
    use crate::config::LayoutConfig;
    use crate::library::fixtures::{artist, document, genre};
    use crate::library::{Graph, Metric};

    fn model() -> ViewModel {
        let graph = Graph::from_document(document(
            vec![genre(0, "Rock", 8, 2), artist(0, "Pixies", 4, 2)],
            &[(1, 0)],
        ))
        .expect("valid graph");
        ViewModel::new(graph, Metric::Songs, LayoutConfig::default(), 1)
    }

    #[test]
    fn topmost_node_wins_under_the_pointer() {
        let positions = vec![pos2(10.0, 10.0), pos2(14.0, 10.0), pos2(200.0, 200.0)];
        let radii = vec![8.0, 8.0, 8.0];
        let visible = vec![0, 1, 2];

        assert_eq!(
            ViewModel::hovered_index(Some(pos2(12.0, 10.0)), &visible, &positions, &radii),
            Some(1)
        );
        assert_eq!(
            ViewModel::hovered_index(Some(pos2(100.0, 100.0)), &visible, &positions, &radii),
            None
        );
        assert_eq!(ViewModel::hovered_index(None, &visible, &positions, &radii), None);
    }

    #[test]
    fn offscreen_nodes_are_culled() {
        let rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 100.0));
        let positions = vec![pos2(50.0, 50.0), pos2(400.0, 50.0)];
        let mut visible = vec![7];

        ViewModel::visible_indices_into(rect, &positions, &[5.0, 5.0], &mut visible);
        assert_eq!(visible, vec![0]);
    }

    #[test]
    fn pointer_moves_become_hover_transitions() {
        let mut model = model();

        model.sync_hover(Some(1));
        assert_eq!(model.controller.hovered(), Some(1));
        assert_eq!(model.render_state.labels.len(), 1);

        model.sync_hover(Some(0));
        assert_eq!(model.controller.hovered(), Some(0));
        assert_eq!(model.render_state.labels[0].node, 1);

        model.sync_hover(None);
        assert_eq!(model.controller.hovered(), None);
        assert!(model.render_state.labels.is_empty());
        assert!(model.render_state.tooltip.is_none());
    }

    #[test]
    fn drag_grabs_the_node_under_the_press_point() {
        let mut model = model();
        let scratch = &mut model.cache.view_scratch;
        scratch.screen_positions = vec![pos2(100.0, 100.0), pos2(40.0, 40.0)];
        scratch.screen_radii = vec![20.0, 2.0];
        scratch.visible_indices = vec![0, 1];

        // Six pixels of travel leaves the small node behind.
        let press = pos2(40.0, 40.0);
        let after_threshold = pos2(46.0, 40.0);
        assert_eq!(
            ViewModel::hovered_index(
                Some(after_threshold),
                &scratch.visible_indices,
                &scratch.screen_positions,
                &scratch.screen_radii,
            ),
            None
        );

        model.begin_node_drag(Some(press));
        assert_eq!(model.dragging, Some(1));

        model.end_node_drag();
        model.begin_node_drag(Some(after_threshold));
        assert_eq!(model.dragging, None);
    }

    #[test]
    fn dragging_pins_then_releases() {
        let mut model = model();
        model.dragging = Some(1);

        model.drag_node_to(1, vec2(42.0, -17.0), 3.0);
        assert!(model.cache.simulation.is_pinned(1));
        assert!(model.cache.simulation.is_running());
        assert_eq!(model.cache.simulation.positions()[1], vec2(42.0, -17.0));

        model.cache.simulation.tick(3.1);
        assert_eq!(model.cache.simulation.positions()[1], vec2(42.0, -17.0));

        model.end_node_drag();
        assert_eq!(model.dragging, None);
        assert!(!model.cache.simulation.is_pinned(1));
    }
}
