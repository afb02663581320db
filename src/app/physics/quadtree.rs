use eframe::egui::{Vec2, vec2};

const QUADTREE_LEAF_CAPACITY: usize = 8;
const QUADTREE_MAX_DEPTH: usize = 12;

#[derive(Clone, Copy, Debug)]
pub(super) struct QuadBounds {
    pub(super) center: Vec2,
    pub(super) half_extent: f32,
}

impl QuadBounds {
    fn from_points(points: &[Vec2]) -> Option<Self> {
        // f32::min/max ignore NaN, so the fold alone cannot catch one.
        if points.iter().any(|point| !(point.x.is_finite() && point.y.is_finite())) {
            return None;
        }

        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);

        for point in points {
            min.x = min.x.min(point.x);
            min.y = min.y.min(point.y);
            max.x = max.x.max(point.x);
            max.y = max.y.max(point.y);
        }

        if !min.x.is_finite() || !min.y.is_finite() || !max.x.is_finite() || !max.y.is_finite() {
            return None;
        }

        let center = (min + max) * 0.5;
        let span_x = (max.x - min.x).max(1.0);
        let span_y = (max.y - min.y).max(1.0);
        let half_extent = (span_x.max(span_y) * 0.5) + 1.0;

        Some(Self {
            center,
            half_extent,
        })
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        let min = self.center - vec2(self.half_extent, self.half_extent);
        let max = self.center + vec2(self.half_extent, self.half_extent);
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }

    fn child(self, quadrant: usize) -> Self {
        let quarter = self.half_extent * 0.5;
        let offset = match quadrant {
            0 => vec2(-quarter, -quarter),
            1 => vec2(quarter, -quarter),
            2 => vec2(-quarter, quarter),
            _ => vec2(quarter, quarter),
        };

        Self {
            center: self.center + offset,
            half_extent: quarter,
        }
    }

    fn quadrant_for(self, point: Vec2) -> usize {
        let right = point.x >= self.center.x;
        let upper = point.y >= self.center.y;
        match (right, upper) {
            (false, false) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (true, true) => 3,
        }
    }

    pub(super) fn side_length(self) -> f32 {
        self.half_extent * 2.0
    }
}

/// Barnes-Hut cell. `strength` is the summed repulsion magnitude of every
/// body below it and `center` is weighted by those magnitudes.
pub(super) struct QuadNode {
    pub(super) bounds: QuadBounds,
    pub(super) center: Vec2,
    pub(super) strength: f32,
    pub(super) indices: Vec<usize>,
    pub(super) children: [Option<Box<QuadNode>>; 4],
}

impl QuadNode {
    pub(super) fn build(positions: &[Vec2], strengths: &[f32]) -> Option<Self> {
        let bounds = QuadBounds::from_points(positions)?;
        let indices = (0..positions.len()).collect::<Vec<_>>();
        Some(Self::build_node(bounds, indices, positions, strengths, 0))
    }

    fn build_node(
        bounds: QuadBounds,
        indices: Vec<usize>,
        positions: &[Vec2],
        strengths: &[f32],
        depth: usize,
    ) -> Self {
        let mut weighted = Vec2::ZERO;
        let mut geometric = Vec2::ZERO;
        let mut strength = 0.0;
        for &index in &indices {
            let body = strengths[index];
            weighted += positions[index] * body;
            geometric += positions[index];
            strength += body;
        }

        let center = if strength > 0.0 {
            weighted / strength
        } else if !indices.is_empty() {
            geometric / indices.len() as f32
        } else {
            bounds.center
        };

        let mut node = Self {
            bounds,
            center,
            strength,
            indices,
            children: std::array::from_fn(|_| None),
        };

        if depth >= QUADTREE_MAX_DEPTH || node.indices.len() <= QUADTREE_LEAF_CAPACITY {
            return node;
        }

        let mut buckets = std::array::from_fn::<_, 4, _>(|_| Vec::new());
        for &index in &node.indices {
            let quadrant = bounds.quadrant_for(positions[index]);
            buckets[quadrant].push(index);
        }

        let non_empty = buckets.iter().filter(|bucket| !bucket.is_empty()).count();
        if non_empty <= 1 {
            return node;
        }

        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }

            let child_bounds = bounds.child(quadrant);
            node.children[quadrant] = Some(Box::new(Self::build_node(
                child_bounds,
                bucket,
                positions,
                strengths,
                depth + 1,
            )));
        }
        node.indices.clear();
        node
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(|child| child.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(count: usize) -> Vec<Vec2> {
        (0..count)
            .map(|index| vec2((index % 10) as f32 * 15.0, (index / 10) as f32 * 15.0))
            .collect()
    }

    fn leaf_count(node: &QuadNode) -> usize {
        if node.is_leaf() {
            return node.indices.len();
        }
        node.children
            .iter()
            .flatten()
            .map(|child| leaf_count(child))
            .sum()
    }

    #[test]
    fn every_body_lands_in_exactly_one_leaf() {
        let positions = grid(64);
        let strengths = vec![1.0; positions.len()];
        let tree = QuadNode::build(&positions, &strengths).expect("finite points");

        assert!(!tree.is_leaf());
        assert_eq!(leaf_count(&tree), 64);
        assert_eq!(tree.strength, 64.0);
    }

    #[test]
    fn center_is_strength_weighted() {
        let positions = vec![vec2(0.0, 0.0), vec2(10.0, 0.0)];
        let tree = QuadNode::build(&positions, &[3.0, 1.0]).expect("finite points");
        assert_eq!(tree.center, vec2(2.5, 0.0));

        let inert = QuadNode::build(&positions, &[0.0, 0.0]).expect("finite points");
        assert_eq!(inert.center, vec2(5.0, 0.0));
    }

    #[test]
    fn non_finite_points_build_nothing() {
        let positions = vec![vec2(f32::NAN, 0.0), vec2(1.0, 1.0)];
        assert!(QuadNode::build(&positions, &[1.0, 1.0]).is_none());

        let trailing_nan = vec![vec2(0.0, 0.0), vec2(2.0, 2.0), vec2(1.0, f32::NAN)];
        assert!(QuadNode::build(&trailing_nan, &[1.0; 3]).is_none());

        let infinite = vec![vec2(0.0, 0.0), vec2(f32::INFINITY, 3.0)];
        assert!(QuadNode::build(&infinite, &[1.0, 1.0]).is_none());
    }

    #[test]
    fn coincident_points_stay_in_one_leaf() {
        let positions = vec![vec2(4.0, 4.0); 20];
        let tree = QuadNode::build(&positions, &vec![1.0; 20]).expect("finite points");
        assert!(tree.is_leaf());
        assert_eq!(tree.indices.len(), 20);
    }
}
