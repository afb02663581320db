use eframe::egui::{Vec2, vec2};

use crate::config::LabelFormat;
use crate::library::Node;
use crate::util::truncate_label;

use super::{HoverContext, NodeLabel, Tooltip};

const LABEL_GAP: f32 = 5.0;
const TOOLTIP_GAP: f32 = 10.0;

fn anchor(context: &HoverContext<'_>, index: usize) -> Vec2 {
    context.positions.get(index).copied().unwrap_or(Vec2::ZERO)
}

fn radius(context: &HoverContext<'_>, index: usize) -> f32 {
    context.radii.get(index).copied().unwrap_or(0.0)
}

pub(super) fn connected_labels(hovered: usize, context: &HoverContext<'_>) -> Vec<NodeLabel> {
    context
        .graph
        .nodes
        .iter()
        .enumerate()
        .filter(|&(other, _)| other != hovered && context.adjacency.is_connected(hovered, other))
        .map(|(other, node)| {
            let offset = vec2(0.0, radius(context, other) + LABEL_GAP);
            NodeLabel {
                node: other,
                text: truncate_label(&node.name, context.config.label_chars).to_owned(),
                offset,
                position: anchor(context, other) + offset,
            }
        })
        .collect()
}

pub(super) fn tooltip_text(node: &Node, format: LabelFormat) -> String {
    match format {
        LabelFormat::SongsAndPlays => format!(
            "{} / Songs: {} / Plays: {}",
            node.name, node.song_count, node.play_count
        ),
        LabelFormat::CountOnly => format!("{} / Count: {}", node.name, node.song_count),
    }
}

/// Summary for the hovered node, placed just past its rim.
pub(super) fn tooltip_for(hovered: usize, context: &HoverContext<'_>) -> Tooltip {
    let offset = vec2(0.0, radius(context, hovered) + TOOLTIP_GAP);
    let text = context
        .graph
        .nodes
        .get(hovered)
        .map(|node| tooltip_text(node, context.config.label_format))
        .unwrap_or_default();

    Tooltip {
        node: hovered,
        text,
        offset,
        position: anchor(context, hovered) + offset,
    }
}
