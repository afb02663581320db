use eframe::egui::{Color32, Vec2};

use crate::library::{Graph, NodeKind};

use super::super::highlight::RenderState;

pub(in crate::app) const GENRE_FILL: Color32 = Color32::from_rgb(0x31, 0x82, 0xbd);
pub(in crate::app) const ARTIST_FILL: Color32 = Color32::from_rgb(0xc6, 0xdb, 0xef);
pub(in crate::app) const LABEL_COLOR: Color32 = Color32::from_rgb(0xc1, 0x70, 0x21);

pub(in crate::app) fn fill_for(kind: NodeKind) -> Color32 {
    match kind {
        NodeKind::Genre => GENRE_FILL,
        NodeKind::Artist => ARTIST_FILL,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) struct Circle {
    pub node: usize,
    pub center: Vec2,
    pub radius: f32,
    pub fill: Color32,
    pub opacity: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) struct Line {
    pub from: Vec2,
    pub to: Vec2,
    pub opacity: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum TextRole {
    Label,
    Tooltip,
}

#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) struct Text {
    pub position: Vec2,
    pub content: String,
    pub role: TextRole,
}

/// World-space draw list for one frame: lines under circles under text.
#[derive(Clone, Debug, Default, PartialEq)]
pub(in crate::app) struct Scene {
    pub lines: Vec<Line>,
    pub circles: Vec<Circle>,
    pub texts: Vec<Text>,
}

pub(in crate::app) fn build_scene(
    graph: &Graph,
    positions: &[Vec2],
    radii: &[f32],
    state: &RenderState,
) -> Scene {
    let opacity = |values: &[f32], index: usize| values.get(index).copied().unwrap_or(1.0);

    let lines = graph
        .edges
        .iter()
        .enumerate()
        .filter_map(|(index, edge)| {
            Some(Line {
                from: *positions.get(edge.source)?,
                to: *positions.get(edge.target)?,
                opacity: opacity(&state.edge_opacity, index),
            })
        })
        .collect();

    let circles = graph
        .nodes
        .iter()
        .zip(positions)
        .zip(radii)
        .enumerate()
        .map(|(index, ((node, &center), &radius))| Circle {
            node: index,
            center,
            radius,
            fill: fill_for(node.kind),
            opacity: opacity(&state.node_opacity, index),
        })
        .collect();

    let mut texts = state
        .labels
        .iter()
        .map(|label| Text {
            position: label.position,
            content: label.text.clone(),
            role: TextRole::Label,
        })
        .collect::<Vec<_>>();
    if let Some(tooltip) = &state.tooltip {
        texts.push(Text {
            position: tooltip.position,
            content: tooltip.text.clone(),
            role: TextRole::Tooltip,
        });
    }

    Scene {
        lines,
        circles,
        texts,
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;
    use crate::app::adjacency::AdjacencyIndex;
    use crate::app::highlight::{HoverContext, InteractionController};
    use crate::config::LayoutConfig;
    use crate::library::fixtures::{artist, document, genre};

    fn graph() -> Graph {
        Graph::from_document(document(
            vec![
                genre(0, "Rock", 8, 2),
                artist(0, "Pixies", 4, 2),
                artist(1, "Low", 3, 1),
            ],
            &[(1, 0)],
        ))
        .expect("valid graph")
    }

    #[test]
    fn idle_scene_draws_everything_opaque() {
        let graph = graph();
        let positions = vec![vec2(0.0, 0.0), vec2(30.0, 0.0), vec2(0.0, 40.0)];
        let radii = vec![40.0, 25.0, 18.75];
        let state = RenderState::new(3, 1);

        let scene = build_scene(&graph, &positions, &radii, &state);

        assert_eq!(
            scene.lines,
            vec![Line {
                from: vec2(30.0, 0.0),
                to: vec2(0.0, 0.0),
                opacity: 1.0,
            }]
        );
        assert_eq!(scene.circles.len(), 3);
        assert_eq!(scene.circles[0].fill, GENRE_FILL);
        assert_eq!(scene.circles[2].fill, ARTIST_FILL);
        assert_eq!(scene.circles[2].radius, 18.75);
        assert!(scene.circles.iter().all(|circle| circle.opacity == 1.0));
        assert!(scene.texts.is_empty());
    }

    #[test]
    fn hover_flows_into_scene() {
        let graph = graph();
        let positions = vec![vec2(0.0, 0.0), vec2(30.0, 0.0), vec2(0.0, 40.0)];
        let radii = vec![40.0, 25.0, 18.75];
        let adjacency = AdjacencyIndex::build(&graph.edges);
        let config = LayoutConfig::default();
        let mut state = RenderState::new(3, 1);
        let mut controller = InteractionController::new(0);
        let context = HoverContext {
            graph: &graph,
            adjacency: &adjacency,
            radii: &radii,
            positions: &positions,
            config: &config,
        };
        controller.on_hover_enter(controller.handle(1), &context, &mut state);

        let scene = build_scene(&graph, &positions, &radii, &state);

        let opacities = scene
            .circles
            .iter()
            .map(|circle| circle.opacity)
            .collect::<Vec<_>>();
        assert_eq!(opacities, vec![1.0, 1.0, 0.2]);
        assert_eq!(scene.lines[0].opacity, 1.0);
        assert_eq!(
            scene.texts,
            vec![
                Text {
                    position: vec2(0.0, 45.0),
                    content: "Rock".to_owned(),
                    role: TextRole::Label,
                },
                Text {
                    position: vec2(30.0, 35.0),
                    content: "Pixies / Songs: 4 / Plays: 2".to_owned(),
                    role: TextRole::Tooltip,
                },
            ]
        );
    }
}
