use crate::library::{Graph, Metric, NodeKind};

const GENRE_SCALE: f32 = 40.0;
const GENRE_MIN_RADIUS: f32 = 4.0;
const ARTIST_SCALE: f32 = 25.0;
const ARTIST_MIN_RADIUS: f32 = 2.0;
const CHARGE_SCALE: f32 = 1000.0;

pub(in crate::app) fn radius_for(kind: NodeKind, weight: f32) -> f32 {
    match kind {
        NodeKind::Genre => (weight * GENRE_SCALE).max(GENRE_MIN_RADIUS),
        NodeKind::Artist => (weight * ARTIST_SCALE).max(ARTIST_MIN_RADIUS),
    }
}

/// Repulsion strength; negative pushes neighbours away.
pub(in crate::app) fn charge_for(weight: f32) -> f32 {
    -weight * CHARGE_SCALE
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct NodeStyle {
    pub weight: f32,
    pub radius: f32,
    pub charge: f32,
}

pub(in crate::app) fn node_styles(graph: &Graph, metric: Metric) -> Vec<NodeStyle> {
    graph
        .nodes
        .iter()
        .enumerate()
        .map(|(index, node)| {
            let weight = graph.weight(index, metric);
            NodeStyle {
                weight,
                radius: radius_for(node.kind, weight),
                charge: charge_for(weight),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::fixtures::{artist, document, genre};

    fn graph() -> Graph {
        Graph::from_document(document(
            vec![
                genre(0, "G1", 10, 1),
                genre(1, "G2", 5, 4),
                artist(0, "A1", 8, 0),
                artist(1, "A2", 1, 20),
                artist(2, "A3", 0, 0),
            ],
            &[(0, 1)],
        ))
        .expect("valid graph")
    }

    #[test]
    fn genre_scenario_radii() {
        let styles = node_styles(&graph(), Metric::Songs);
        assert_eq!(styles[0].weight, 1.0);
        assert_eq!(styles[0].radius, 40.0);
        assert_eq!(styles[1].weight, 0.5);
        assert_eq!(styles[1].radius, 20.0);
        assert_eq!(styles[0].charge, -1000.0);
        assert_eq!(styles[1].charge, -500.0);
    }

    #[test]
    fn radius_respects_type_floors() {
        let graph = graph();
        for metric in [Metric::Songs, Metric::Plays] {
            for (node, style) in graph.nodes.iter().zip(node_styles(&graph, metric)) {
                let floor = match node.kind {
                    NodeKind::Genre => GENRE_MIN_RADIUS,
                    NodeKind::Artist => ARTIST_MIN_RADIUS,
                };
                assert!(style.radius >= floor, "{} under {metric}", node.name);
            }
        }
    }

    #[test]
    fn zero_value_node_is_inert_at_minimum_size() {
        let styles = node_styles(&graph(), Metric::Songs);
        assert_eq!(styles[4].weight, 0.0);
        assert_eq!(styles[4].radius, ARTIST_MIN_RADIUS);
        assert_eq!(styles[4].charge, 0.0);
    }

    #[test]
    fn radius_is_monotonic_in_weight() {
        for kind in [NodeKind::Genre, NodeKind::Artist] {
            let mut previous = 0.0;
            for step in 0..=100 {
                let radius = radius_for(kind, step as f32 / 100.0);
                assert!(radius >= previous);
                previous = radius;
            }
        }
    }

    #[test]
    fn switching_metric_keeps_counts_and_is_idempotent() {
        let graph = graph();
        let songs = node_styles(&graph, Metric::Songs);
        let plays = node_styles(&graph, Metric::Plays);

        assert_eq!(songs.len(), graph.node_count());
        assert_eq!(plays.len(), graph.node_count());
        assert_ne!(songs, plays);
        assert_eq!(songs, node_styles(&graph, Metric::Songs));
        assert_eq!(plays[3].radius, 25.0);
    }
}
