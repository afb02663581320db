use eframe::egui::{self, Align2, Color32, FontId, Rect, Sense, Stroke, Ui, Vec2, vec2};

use super::super::render_utils::{circle_visible, draw_background, with_opacity, world_to_screen};
use super::super::{RenderGraph, ViewModel};
use super::scene::{LABEL_COLOR, Scene, TextRole, build_scene};

const EDGE_COLOR: Color32 = Color32::from_rgb(0x99, 0x99, 0x99);
const RIM_COLOR: Color32 = Color32::WHITE;

fn screen_radius(radius: f32, zoom: f32) -> f32 {
    (radius * zoom).max(1.0)
}

impl ViewModel {
    fn update_screen_space(rect: Rect, pan: Vec2, zoom: f32, cache: &mut RenderGraph) {
        let scratch = &mut cache.view_scratch;
        scratch.screen_positions.clear();
        scratch.screen_positions.extend(
            cache
                .simulation
                .positions()
                .iter()
                .map(|&world| world_to_screen(rect, pan, zoom, world)),
        );
        scratch.screen_radii.clear();
        scratch
            .screen_radii
            .extend(cache.radii.iter().map(|&radius| screen_radius(radius, zoom)));

        Self::visible_indices_into(
            rect,
            &scratch.screen_positions,
            &scratch.screen_radii,
            &mut scratch.visible_indices,
        );
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        let now = ui.input(|input| input.time);

        draw_background(&painter, rect, self.pan, self.zoom);

        if self.start_pending {
            self.start_pending = false;
            self.cache.simulation.start(now);
        }

        self.handle_graph_zoom(ui, rect, &response);
        Self::update_screen_space(rect, self.pan, self.zoom, &mut self.cache);

        let pointer = if response.contains_pointer() {
            ui.input(|input| input.pointer.hover_pos())
        } else {
            None
        };
        let under_pointer = Self::hovered_index(
            pointer,
            &self.cache.view_scratch.visible_indices,
            &self.cache.view_scratch.screen_positions,
            &self.cache.view_scratch.screen_radii,
        );

        let press_origin = ui.input(|input| input.pointer.press_origin());
        self.handle_node_drag(rect, &response, press_origin, now);
        self.handle_graph_pan(&response);
        self.sync_hover(self.dragging.or(under_pointer));

        if under_pointer.is_some() || self.dragging.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = if self.dragging.is_some() {
                    egui::CursorIcon::Grabbing
                } else {
                    egui::CursorIcon::Grab
                };
            });
        }

        if let Some(event) = self.cache.simulation.tick(now) {
            log::trace!("tick {} alpha {:.4}", event.sequence, event.alpha);
            self.controller.on_tick(event.positions, &mut self.render_state);
        }

        let scene = build_scene(
            &self.graph,
            self.cache.simulation.positions(),
            &self.cache.radii,
            &self.render_state,
        );
        self.paint_scene(&painter, rect, &scene);

        if self.cache.simulation.is_running() || self.dragging.is_some() {
            ui.ctx().request_repaint();
        }
    }

    fn paint_scene(&self, painter: &egui::Painter, rect: Rect, scene: &Scene) {
        let to_screen = |world| world_to_screen(rect, self.pan, self.zoom, world);
        let line_width = self.zoom.sqrt().clamp(0.5, 3.0);

        for line in &scene.lines {
            painter.line_segment(
                [to_screen(line.from), to_screen(line.to)],
                Stroke::new(line_width, with_opacity(EDGE_COLOR, line.opacity)),
            );
        }

        for circle in &scene.circles {
            let center = to_screen(circle.center);
            let radius = screen_radius(circle.radius, self.zoom);
            if !circle_visible(rect, center, radius) {
                continue;
            }
            let rim = if self.cache.simulation.is_pinned(circle.node) {
                Stroke::new(2.5, LABEL_COLOR)
            } else {
                Stroke::new(1.5, with_opacity(RIM_COLOR, circle.opacity))
            };
            painter.circle(center, radius, with_opacity(circle.fill, circle.opacity), rim);
        }

        for text in &scene.texts {
            let anchor = to_screen(text.position);
            match text.role {
                TextRole::Label => {
                    painter.text(
                        anchor,
                        Align2::CENTER_TOP,
                        &text.content,
                        FontId::proportional(11.0),
                        LABEL_COLOR,
                    );
                }
                TextRole::Tooltip => {
                    let galley = painter.layout_no_wrap(
                        text.content.clone(),
                        FontId::proportional(12.0),
                        Color32::from_gray(30),
                    );
                    let min = anchor - vec2(galley.size().x * 0.5, 0.0);
                    let frame = Rect::from_min_size(min, galley.size()).expand(4.0);
                    painter.rect_filled(frame, 3.0, Color32::from_rgba_unmultiplied(255, 255, 255, 230));
                    painter.rect_stroke(
                        frame,
                        3.0,
                        Stroke::new(1.0, LABEL_COLOR),
                        egui::StrokeKind::Outside,
                    );
                    painter.galley(min, galley, Color32::from_gray(30));
                }
            }
        }
    }
}
