mod app;
mod config;
mod library;
mod util;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;

use crate::config::{LabelFormat, LayoutConfig};
use crate::library::{
    AggregateOptions, ExportFormat, ExportOptions, GraphSource, Metric, write_graph_document,
};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Graph document (JSON or JSON-P), or a track listing with `--tracks`.
    data: PathBuf,

    /// Aggregate `data` as a track listing: an iTunes library property
    /// list or a JSON array of track records.
    #[arg(long)]
    tracks: bool,

    /// Minimum star rating a track needs to count.
    #[arg(
        long,
        value_name = "STARS",
        default_value_t = 4,
        value_parser = clap::value_parser!(u32).range(0..=5)
    )]
    min_rating: u32,

    /// Write the graph document to PATH and exit.
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// Wrap the export as `itgCallback(...);` with `jsonp`.
    #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
    export_format: ExportFormat,

    /// Pretty-print the export with N spaces per level.
    #[arg(long, value_name = "N")]
    indent: Option<usize>,

    #[arg(long, value_enum, default_value_t = Metric::Songs)]
    metric: Metric,

    #[arg(long, default_value_t = 30.0)]
    link_distance: f32,

    /// Seconds before the layout stops itself; 0 runs until it settles.
    #[arg(long, default_value_t = 10.0)]
    auto_stop_secs: f64,

    #[arg(long, value_enum, default_value_t = LabelFormat::SongsAndPlays)]
    label_format: LabelFormat,

    #[arg(long, default_value_t = 0.1)]
    gravity: f32,
}

impl Args {
    fn source(&self) -> GraphSource {
        if self.tracks {
            GraphSource::Tracks {
                path: self.data.clone(),
                options: AggregateOptions {
                    min_rating_stars: self.min_rating,
                    ..AggregateOptions::default()
                },
            }
        } else {
            GraphSource::Document(self.data.clone())
        }
    }

    fn export_options(&self) -> ExportOptions {
        ExportOptions {
            format: self.export_format,
            indent: self.indent,
        }
    }

    fn layout_config(&self) -> LayoutConfig {
        LayoutConfig {
            link_distance: self.link_distance,
            gravity: self.gravity,
            auto_stop_secs: (self.auto_stop_secs > 0.0).then_some(self.auto_stop_secs),
            label_format: self.label_format,
            ..LayoutConfig::default()
        }
    }
}

fn export(source: &GraphSource, path: &Path, options: ExportOptions) -> anyhow::Result<()> {
    let document = source.read_document()?;
    library::Graph::from_document(document.clone())
        .with_context(|| format!("refusing to export invalid graph from {}", source.path().display()))?;
    write_graph_document(path, &document, options)?;
    log::info!("exported graph document to {}", path.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let source = args.source();

    if let Some(path) = &args.export {
        return export(&source, path, args.export_options());
    }

    let config = args.layout_config();
    let metric = args.metric;
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1280.0, 820.0]),
        ..Default::default()
    };

    eframe::run_native(
        "listen-graph",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::GraphApp::new(
                cc,
                source.clone(),
                config,
                metric,
            )))
        }),
    )
    .map_err(|error| anyhow::anyhow!("failed to run the viewer: {error}"))
}
