use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;

const MIN_DISTANCE: f32 = 1.0;
const MIN_DISTANCE_SQ: f32 = MIN_DISTANCE * MIN_DISTANCE;

#[derive(Clone, Copy)]
pub(super) struct ChargeParams {
    pub(super) alpha: f32,
    pub(super) theta: f32,
}

#[derive(Clone, Copy)]
pub(super) struct LinkParams {
    pub(super) alpha: f32,
    pub(super) distance: f32,
    pub(super) strength: f32,
}

/// Deterministic unit direction for bodies sitting on top of each other.
/// The pair `(a, b)` and `(b, a)` get opposite directions.
pub(super) fn jitter_direction(index: usize, other: usize) -> Vec2 {
    let (low, high) = if index <= other {
        (index, other)
    } else {
        (other, index)
    };
    let angle = ((low as f32) * 0.618_034 + (high as f32) * 0.414_214) * std::f32::consts::TAU;
    let direction = vec2(angle.cos(), angle.sin());
    if index <= other { direction } else { -direction }
}

fn repulsion_from(
    point: Vec2,
    source: Vec2,
    strength: f32,
    alpha: f32,
    pair: (usize, usize),
) -> Vec2 {
    let mut delta = point - source;
    let mut distance_sq = delta.length_sq();
    if !(distance_sq >= MIN_DISTANCE_SQ) {
        delta = jitter_direction(pair.0, pair.1) * MIN_DISTANCE;
        distance_sq = MIN_DISTANCE_SQ;
    }
    delta * (alpha * strength / distance_sq)
}

/// Exact n-body repulsion over every ordered pair.
pub(super) fn accumulate_pairwise_repulsion(
    positions: &[Vec2],
    strengths: &[f32],
    alpha: f32,
    forces: &mut [Vec2],
) {
    for (index, force) in forces.iter_mut().enumerate() {
        let point = positions[index];
        for (other, &source) in positions.iter().enumerate() {
            if other == index || strengths[other] <= 0.0 {
                continue;
            }
            *force += repulsion_from(point, source, strengths[other], alpha, (index, other));
        }
    }
}

pub(super) fn accumulate_repulsion_for_node(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    strengths: &[f32],
    params: ChargeParams,
    force: &mut Vec2,
) {
    if node.strength <= 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other in &node.indices {
            if other == index || strengths[other] <= 0.0 {
                continue;
            }
            *force += repulsion_from(
                point,
                positions[other],
                strengths[other],
                params.alpha,
                (index, other),
            );
        }
        return;
    }

    let delta = point - node.center;
    let distance_sq = delta.length_sq().max(MIN_DISTANCE_SQ);
    let distance = distance_sq.sqrt();
    let can_approximate =
        !node.bounds.contains(point) && (node.bounds.side_length() / distance) < params.theta;

    if can_approximate {
        *force += delta * (params.alpha * node.strength / distance_sq);
        return;
    }

    for child in node.children.iter().flatten() {
        accumulate_repulsion_for_node(child, index, positions, strengths, params, force);
    }
}

/// Springs toward `distance`; the correction is split between endpoints by
/// degree so hubs move less than leaves.
pub(super) fn accumulate_links(
    links: &[(usize, usize)],
    degrees: &[u32],
    positions: &[Vec2],
    params: LinkParams,
    forces: &mut [Vec2],
) {
    let node_count = positions.len();
    for &(source, target) in links {
        if source >= node_count || target >= node_count || source == target {
            continue;
        }

        let delta = positions[target] - positions[source];
        let length = delta.length();
        if !(length > 0.0001) {
            continue;
        }

        let scale = params.alpha * params.strength * (length - params.distance) / length;
        let correction = delta * scale;
        let source_degree = degrees[source].max(1) as f32;
        let target_degree = degrees[target].max(1) as f32;
        let bias = source_degree / (source_degree + target_degree);

        forces[target] -= correction * bias;
        forces[source] += correction * (1.0 - bias);
    }
}

pub(super) fn accumulate_gravity(positions: &[Vec2], pull: f32, forces: &mut [Vec2]) {
    if pull <= 0.0 {
        return;
    }
    for (force, position) in forces.iter_mut().zip(positions) {
        *force -= *position * pull;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jitter_directions_oppose() {
        let forward = jitter_direction(2, 7);
        let backward = jitter_direction(7, 2);
        assert!((forward + backward).length() < 1e-6);
        assert!((forward.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn coincident_bodies_are_pushed_apart_finitely() {
        let positions = vec![vec2(5.0, 5.0), vec2(5.0, 5.0)];
        let mut forces = vec![Vec2::ZERO; 2];
        accumulate_pairwise_repulsion(&positions, &[100.0, 100.0], 0.1, &mut forces);

        assert!(forces.iter().all(|force| force.x.is_finite() && force.y.is_finite()));
        assert!(forces[0].length() > 0.0);
        assert!((forces[0] + forces[1]).length() < 1e-4);
    }

    #[test]
    fn only_charged_sources_push() {
        let positions = vec![vec2(0.0, 0.0), vec2(10.0, 0.0)];
        let mut forces = vec![Vec2::ZERO; 2];
        accumulate_pairwise_repulsion(&positions, &[0.0, 500.0], 0.1, &mut forces);

        assert!(forces[0].x < 0.0);
        assert_eq!(forces[1], Vec2::ZERO);
    }

    #[test]
    fn barnes_hut_tracks_exact_repulsion() {
        let positions = (0..200)
            .map(|index| {
                let angle = index as f32 * 0.37;
                vec2(angle.cos(), angle.sin()) * (20.0 + index as f32 * 2.0)
            })
            .collect::<Vec<_>>();
        let strengths = vec![100.0; positions.len()];
        let alpha = 0.1;

        let mut exact = vec![Vec2::ZERO; positions.len()];
        accumulate_pairwise_repulsion(&positions, &strengths, alpha, &mut exact);

        let tree = QuadNode::build(&positions, &strengths).expect("finite");
        let params = ChargeParams { alpha, theta: 0.8 };
        let mut total_error = 0.0;
        let mut total_magnitude = 0.0;
        for (index, expected) in exact.iter().enumerate() {
            let mut approx = Vec2::ZERO;
            accumulate_repulsion_for_node(&tree, index, &positions, &strengths, params, &mut approx);
            assert!(approx.x.is_finite() && approx.y.is_finite());
            total_error += (approx - *expected).length();
            total_magnitude += expected.length();
        }
        assert!(
            total_error <= total_magnitude * 0.2,
            "error {total_error} against magnitude {total_magnitude}"
        );
    }

    #[test]
    fn links_pull_stretched_pairs_together() {
        let positions = vec![vec2(0.0, 0.0), vec2(100.0, 0.0)];
        let mut forces = vec![Vec2::ZERO; 2];
        accumulate_links(
            &[(0, 1)],
            &[1, 1],
            &positions,
            LinkParams {
                alpha: 0.1,
                distance: 30.0,
                strength: 1.0,
            },
            &mut forces,
        );

        assert!(forces[0].x > 0.0);
        assert!(forces[1].x < 0.0);
        assert!((forces[0].x - 3.5).abs() < 1e-4);
    }

    #[test]
    fn links_skip_self_loops_and_bad_indices() {
        let positions = vec![vec2(0.0, 0.0), vec2(50.0, 0.0)];
        let mut forces = vec![Vec2::ZERO; 2];
        let params = LinkParams {
            alpha: 0.1,
            distance: 30.0,
            strength: 1.0,
        };
        accumulate_links(&[(0, 0), (1, 9)], &[1, 1], &positions, params, &mut forces);
        assert_eq!(forces, vec![Vec2::ZERO; 2]);
    }
}
