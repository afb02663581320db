use std::collections::HashSet;

use crate::library::Edge;

/// Symmetric set of linked index pairs.
#[derive(Clone, Debug, Default)]
pub(in crate::app) struct AdjacencyIndex {
    pairs: HashSet<(usize, usize)>,
}

impl AdjacencyIndex {
    pub(in crate::app) fn build(edges: &[Edge]) -> Self {
        let mut pairs = HashSet::with_capacity(edges.len() * 2);
        for edge in edges {
            pairs.insert((edge.source, edge.target));
            pairs.insert((edge.target, edge.source));
        }
        Self { pairs }
    }

    pub(in crate::app) fn is_connected(&self, a: usize, b: usize) -> bool {
        a == b || self.pairs.contains(&(a, b))
    }

    pub(in crate::app) fn neighbors_of(&self, index: usize, node_count: usize) -> Vec<usize> {
        (0..node_count)
            .filter(|&other| other != index && self.pairs.contains(&(index, other)))
            .collect()
    }
}
