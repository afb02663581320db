use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

use super::parse::{DocumentEdge, GraphDocument};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Genre,
    Artist,
}

impl NodeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Genre => "genre",
            Self::Artist => "artist",
        }
    }

    /// Single-letter tag used in document ids (`g12`, `a7`).
    pub fn tag(self) -> char {
        match self {
            Self::Genre => 'g',
            Self::Artist => 'a',
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Metric {
    Songs,
    Plays,
}

impl Metric {
    pub fn label(self) -> &'static str {
        match self {
            Self::Songs => "Songs",
            Self::Plays => "Plays",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: u32,
    pub kind: NodeKind,
    pub name: String,
    pub song_count: u64,
    pub play_count: u64,
}

impl Node {
    pub fn raw_value(&self, metric: Metric) -> u64 {
        match metric {
            Metric::Songs => self.song_count,
            Metric::Plays => self.play_count,
        }
    }

    pub fn key(&self) -> String {
        format!("{}{}", self.kind.tag(), self.id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
}

impl Edge {
    pub fn touches(self, index: usize) -> bool {
        self.source == index || self.target == index
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Maxima {
    pub genre_songs: u64,
    pub artist_songs: u64,
    pub genre_plays: u64,
    pub artist_plays: u64,
}

impl Maxima {
    pub fn get(&self, kind: NodeKind, metric: Metric) -> u64 {
        match (kind, metric) {
            (NodeKind::Genre, Metric::Songs) => self.genre_songs,
            (NodeKind::Artist, Metric::Songs) => self.artist_songs,
            (NodeKind::Genre, Metric::Plays) => self.genre_plays,
            (NodeKind::Artist, Metric::Plays) => self.artist_plays,
        }
    }

    pub fn observe(&mut self, node: &Node) {
        let (songs, plays) = match node.kind {
            NodeKind::Genre => (&mut self.genre_songs, &mut self.genre_plays),
            NodeKind::Artist => (&mut self.artist_songs, &mut self.artist_plays),
        };
        *songs = (*songs).max(node.song_count);
        *plays = (*plays).max(node.play_count);
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidGraphData {
    #[error("max {kind} {metric} is 0 but {kind} nodes have positive values")]
    ZeroMaximum { kind: NodeKind, metric: Metric },
    #[error("{kind} node {name:?} has {metric} {value}, above the declared maximum {maximum}")]
    MaximumBelowValue {
        kind: NodeKind,
        metric: Metric,
        maximum: u64,
        value: u64,
        name: String,
    },
    #[error("edge {edge} references node index {index}, but the graph has {node_count} nodes")]
    UnknownNodeIndex {
        edge: usize,
        index: usize,
        node_count: usize,
    },
    #[error("duplicate {kind} id {id}")]
    DuplicateNodeId { kind: NodeKind, id: u32 },
}

/// A fully validated genre/artist graph. Node order defines the dense
/// `index` used everywhere else in the crate.
#[derive(Clone, Debug, PartialEq)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub maxima: Maxima,
}

impl Graph {
    pub fn from_document(document: GraphDocument) -> Result<Self, InvalidGraphData> {
        let nodes = document
            .nodes
            .into_iter()
            .map(|node| Node {
                id: node.id,
                kind: node.kind.into(),
                name: node.name,
                song_count: node.song_count,
                play_count: node.play_count,
            })
            .collect::<Vec<_>>();

        let mut seen = HashSet::with_capacity(nodes.len());
        for node in &nodes {
            if !seen.insert((node.kind, node.id)) {
                return Err(InvalidGraphData::DuplicateNodeId {
                    kind: node.kind,
                    id: node.id,
                });
            }
        }

        let node_count = nodes.len();
        let edges = document
            .edges
            .iter()
            .enumerate()
            .map(|(edge, &DocumentEdge { source, target })| {
                for index in [source, target] {
                    if index >= node_count {
                        return Err(InvalidGraphData::UnknownNodeIndex {
                            edge,
                            index,
                            node_count,
                        });
                    }
                }
                Ok(Edge { source, target })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let maxima = Maxima {
            genre_songs: document.max_genre_songs,
            artist_songs: document.max_artist_songs,
            genre_plays: document.max_genre_plays,
            artist_plays: document.max_artist_plays,
        };
        validate_maxima(&nodes, maxima)?;

        Ok(Self {
            nodes,
            edges,
            maxima,
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn count_of(&self, kind: NodeKind) -> usize {
        self.nodes.iter().filter(|node| node.kind == kind).count()
    }

    pub fn max_for(&self, kind: NodeKind, metric: Metric) -> u64 {
        self.maxima.get(kind, metric)
    }

    /// Normalized weight in `[0, 1]`. Validation guarantees the maximum is
    /// positive whenever the raw value is.
    pub fn weight(&self, index: usize, metric: Metric) -> f32 {
        let Some(node) = self.nodes.get(index) else {
            return 0.0;
        };

        let raw = node.raw_value(metric);
        let max = self.max_for(node.kind, metric);
        if raw == 0 || max == 0 {
            return 0.0;
        }

        (raw as f64 / max as f64) as f32
    }
}

fn validate_maxima(nodes: &[Node], declared: Maxima) -> Result<(), InvalidGraphData> {
    let mut observed = Maxima::default();
    for node in nodes {
        observed.observe(node);
    }

    for kind in [NodeKind::Genre, NodeKind::Artist] {
        for metric in [Metric::Songs, Metric::Plays] {
            let maximum = declared.get(kind, metric);
            let value = observed.get(kind, metric);

            if maximum == 0 && value > 0 {
                return Err(InvalidGraphData::ZeroMaximum { kind, metric });
            }

            if value > maximum {
                let name = nodes
                    .iter()
                    .find(|node| node.kind == kind && node.raw_value(metric) == value)
                    .map(|node| node.name.clone())
                    .unwrap_or_default();
                return Err(InvalidGraphData::MaximumBelowValue {
                    kind,
                    metric,
                    maximum,
                    value,
                    name,
                });
            }

            if maximum > value {
                log::warn!(
                    "declared max {kind} {metric} is {maximum}, observed maximum is {value}"
                );
            }
        }
    }

    Ok(())
}
