mod aggregate;
mod graph;
mod parse;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use aggregate::{AggregateOptions, aggregate_tracks, read_tracks};
pub use graph::{Edge, Graph, Metric, Node, NodeKind};
pub use parse::{
    ExportFormat, ExportOptions, GraphDocument, read_graph_document, write_graph_document,
};

#[cfg(test)]
pub(crate) use graph::tests as fixtures;

/// Where a graph comes from: a ready-made document or a raw track listing.
#[derive(Clone, Debug)]
pub enum GraphSource {
    Document(PathBuf),
    Tracks {
        path: PathBuf,
        options: AggregateOptions,
    },
}

impl GraphSource {
    pub fn path(&self) -> &Path {
        match self {
            Self::Document(path) => path,
            Self::Tracks { path, .. } => path,
        }
    }

    pub fn read_document(&self) -> Result<GraphDocument> {
        match self {
            Self::Document(path) => read_graph_document(path),
            Self::Tracks { path, options } => {
                let tracks = read_tracks(path)?;
                Ok(aggregate_tracks(&tracks, *options))
            }
        }
    }
}

pub fn load_graph(source: &GraphSource) -> Result<Graph> {
    let document = source.read_document()?;
    let graph = Graph::from_document(document)
        .with_context(|| format!("invalid graph data in {}", source.path().display()))?;

    log::info!(
        "loaded {} nodes ({} genres, {} artists) and {} edges from {}",
        graph.node_count(),
        graph.count_of(NodeKind::Genre),
        graph.count_of(NodeKind::Artist),
        graph.edge_count(),
        source.path().display()
    );

    Ok(graph)
}
