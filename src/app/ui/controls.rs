use eframe::egui::{self, Ui};

use crate::config::LabelFormat;
use crate::library::Metric;

use super::super::ViewModel;
use super::super::graph::{ARTIST_FILL, GENRE_FILL};

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        let now = ui.input(|input| input.time);

        ui.heading("Layout Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Size nodes by");
        let mut metric = self.metric;
        ui.horizontal_wrapped(|ui| {
            for candidate in [Metric::Songs, Metric::Plays] {
                ui.selectable_value(&mut metric, candidate, candidate.label())
                    .on_hover_text(match candidate {
                        Metric::Songs => "Scale nodes by number of songs.",
                        Metric::Plays => "Scale nodes by number of plays.",
                    });
            }
        });
        if metric != self.metric {
            self.set_metric(metric, now);
        }

        ui.separator();

        let mut config_changed = false;

        config_changed |= ui
            .add(
                egui::Slider::new(&mut self.config.link_distance, 5.0..=150.0)
                    .text("Link distance")
                    .clamping(egui::SliderClamping::Always),
            )
            .on_hover_text("Rest length of every artist-genre link.")
            .changed();

        config_changed |= ui
            .add(
                egui::Slider::new(&mut self.config.gravity, 0.0..=1.0)
                    .text("Gravity")
                    .clamping(egui::SliderClamping::Always),
            )
            .on_hover_text("Pull toward the center of the canvas.")
            .changed();

        ui.horizontal(|ui| {
            config_changed |= ui
                .checkbox(&mut self.auto_stop_enabled, "Auto-stop after")
                .on_hover_text("Stop the simulation a fixed time after it starts.")
                .changed();
            config_changed |= ui
                .add_enabled(
                    self.auto_stop_enabled,
                    egui::DragValue::new(&mut self.auto_stop_secs)
                        .range(0.5..=120.0)
                        .speed(0.5)
                        .suffix(" s"),
                )
                .changed();
        });

        ui.separator();

        ui.label("Tooltip");
        let mut label_changed = false;
        label_changed |= ui
            .radio_value(
                &mut self.config.label_format,
                LabelFormat::SongsAndPlays,
                "Name, songs and plays",
            )
            .changed();
        label_changed |= ui
            .radio_value(
                &mut self.config.label_format,
                LabelFormat::CountOnly,
                "Name and count",
            )
            .changed();
        if label_changed {
            self.refresh_hover();
        }

        if config_changed {
            self.apply_config(now);
        }

        ui.separator();

        ui.horizontal(|ui| {
            if ui
                .button("Restart")
                .on_hover_text("Reheat the layout from the current positions.")
                .clicked()
            {
                self.cache.simulation.start(now);
            }
            if ui
                .add_enabled(self.cache.simulation.is_running(), egui::Button::new("Stop"))
                .clicked()
            {
                self.cache.simulation.stop();
            }
        });
        ui.label(self.simulation_status_text());

        ui.separator();
        self.draw_hover_details(ui);
        ui.separator();

        ui.horizontal(|ui| {
            legend_swatch(ui, GENRE_FILL);
            ui.label("Genre");
            ui.add_space(12.0);
            legend_swatch(ui, ARTIST_FILL);
            ui.label("Artist");
        });
        ui.small("Hover a node to highlight its links. Drag a node to pin it while moving.");
    }
}

impl ViewModel {
    fn draw_hover_details(&self, ui: &mut Ui) {
        let Some(index) = self.controller.hovered() else {
            ui.weak("No node hovered");
            return;
        };
        let Some(node) = self.graph.nodes.get(index) else {
            return;
        };

        let linked = self
            .cache
            .adjacency
            .neighbors_of(index, self.graph.node_count())
            .len();
        let weight = self.cache.weights.get(index).copied().unwrap_or(0.0);

        ui.strong(format!("{} ({})", node.name, node.kind));
        ui.label(format!("songs {} | plays {}", node.song_count, node.play_count));
        ui.label(format!("{} weight {weight:.2} | {linked} linked", self.metric));
        if self.cache.simulation.is_pinned(index) {
            ui.label("pinned while dragged");
        }
    }
}

fn legend_swatch(ui: &mut Ui, color: egui::Color32) {
    let (rect, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
    ui.painter().circle_filled(rect.center(), 6.0, color);
}
