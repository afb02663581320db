use eframe::egui::{Vec2, vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LabelFormat {
    /// `name / Songs: n / Plays: n`
    SongsAndPlays,
    /// `name / Count: n`
    CountOnly,
}

/// Tunable knobs for the layout engine and the hover highlight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    pub link_distance: f32,
    pub link_strength: f32,
    pub gravity: f32,
    pub friction: f32,
    pub theta: f32,
    /// Node count at which repulsion switches to the quadtree.
    pub spatial_index_threshold: usize,
    pub alpha_start: f32,
    pub alpha_decay: f32,
    pub alpha_min: f32,
    pub max_speed: f32,
    /// Seconds after `start` at which the engine stops itself.
    pub auto_stop_secs: Option<f64>,
    pub dimmed_opacity: f32,
    pub label_chars: usize,
    pub label_format: LabelFormat,
    pub extent: Vec2,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            link_distance: 30.0,
            link_strength: 1.0,
            gravity: 0.1,
            friction: 0.9,
            theta: 0.8,
            spatial_index_threshold: 150,
            alpha_start: 0.1,
            alpha_decay: 0.99,
            alpha_min: 0.005,
            max_speed: 60.0,
            auto_stop_secs: Some(10.0),
            dimmed_opacity: 0.2,
            label_chars: 16,
            label_format: LabelFormat::SongsAndPlays,
            extent: vec2(900.0, 500.0),
        }
    }
}
