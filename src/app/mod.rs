use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Pos2, Vec2};

use crate::config::LayoutConfig;
use crate::library::{Graph, GraphSource, Metric, load_graph};

mod adjacency;
mod graph;
mod highlight;
mod metric;
mod physics;
mod render_utils;
mod ui;

use adjacency::AdjacencyIndex;
use highlight::{InteractionController, RenderState};
use physics::Simulation;

type LoadResult = Result<Graph, String>;

pub struct GraphApp {
    source: GraphSource,
    config: LayoutConfig,
    initial_metric: Metric,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
    next_revision: u64,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    graph: Graph,
    metric: Metric,
    config: LayoutConfig,
    cache: RenderGraph,
    controller: InteractionController,
    render_state: RenderState,
    pan: Vec2,
    zoom: f32,
    dragging: Option<usize>,
    start_pending: bool,
    auto_stop_enabled: bool,
    auto_stop_secs: f32,
    fps_current: f32,
    fps_samples: VecDeque<f32>,
}

/// Per-revision layout state: the engine plus everything derived from the
/// current metric.
struct RenderGraph {
    revision: u64,
    simulation: Simulation,
    adjacency: AdjacencyIndex,
    weights: Vec<f32>,
    radii: Vec<f32>,
    view_scratch: ViewScratch,
}

#[derive(Default)]
struct ViewScratch {
    screen_positions: Vec<Pos2>,
    screen_radii: Vec<f32>,
    visible_indices: Vec<usize>,
}

impl GraphApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        source: GraphSource,
        config: LayoutConfig,
        initial_metric: Metric,
    ) -> Self {
        let state = AppState::Loading {
            rx: Self::spawn_load(source.clone()),
        };
        Self {
            source,
            config,
            initial_metric,
            state,
            reload_rx: None,
            next_revision: 1,
        }
    }

    fn spawn_load(source: GraphSource) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_graph(&source).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(&self) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(self.source.clone()),
        }
    }

    /// Every successful load is a fresh revision; nothing from the previous
    /// graph is carried over.
    fn ready(&mut self, result: LoadResult) -> AppState {
        match result {
            Ok(graph) => {
                let revision = self.next_revision;
                self.next_revision += 1;
                AppState::Ready(Box::new(ViewModel::new(
                    graph,
                    self.initial_metric,
                    self.config,
                    revision,
                )))
            }
            Err(error) => {
                log::error!("graph load failed: {error}");
                AppState::Error(error)
            }
        }
    }
}

impl eframe::App for GraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let mut loaded = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => loaded = Some(result),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        loaded = Some(Err("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading listening graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                let mut retry = false;
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load listening graph");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
                if retry {
                    transition = Some(self.start_load());
                }
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.source, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.source.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => loaded = Some(result),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            loaded = Some(Err("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(result) = loaded {
            transition = Some(self.ready(result));
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
