use eframe::egui::{Pos2, Rect, Vec2, vec2};

const QUADTREE_LEAF_CAPACITY: usize = 32;
const QUADTREE_MAX_DEPTH: usize = 12;

#[derive(Clone, Copy, Debug)]
struct QuadBounds {
    center: Pos2,
    half_extent: f32,
}

impl QuadBounds {
    fn from_points(points: &[Pos2]) -> Option<Self> {
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

        let center = ((min + max) * 0.5).to_pos2();
        let span_x = (max.x - min.x).max(1.0);
        let span_y = (max.y - min.y).max(1.0);
        let half_extent = (span_x.max(span_y) * 0.5) + 1.0;

        Some(Self {
            center,
            half_extent,
        })
    }

    fn rect(self) -> Rect {
        Rect::from_center_size(self.center, Vec2::splat(self.half_extent * 2.0))
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

    fn quadrant_for(self, point: Pos2) -> usize {
        let right = point.x >= self.center.x;
        let lower = point.y >= self.center.y;
        match (right, lower) {
            (false, false) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (true, true) => 3,
        }
    }
}

#[derive(Debug)]
pub(super) struct QuadNode {
    bounds: QuadBounds,
    indices: Vec<usize>,
    children: [Option<Box<QuadNode>>; 4],
}

impl QuadNode {
    pub(super) fn build(positions: &[Pos2]) -> Option<Self> {
        let bounds = QuadBounds::from_points(positions)?;
        let indices = (0..positions.len()).collect::<Vec<_>>();
        Some(Self::build_node(bounds, indices, positions, 0))
    }

    fn build_node(
        bounds: QuadBounds,
        indices: Vec<usize>,
        positions: &[Pos2],
        depth: usize,
    ) -> Self {
        let mut node = Self {
            bounds,
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

            node.children[quadrant] = Some(Box::new(Self::build_node(
                bounds.child(quadrant),
                bucket,
                positions,
                depth + 1,
            )));
        }
        node.indices.clear();
        node
    }

    /// Appends every index whose position lies inside `area`. Iterative so
    /// query depth never touches the call stack.
    pub(super) fn query(&self, area: Rect, positions: &[Pos2], out: &mut Vec<usize>) {
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            let cell = node.bounds.rect();
            if !cell.intersects(area) {
                continue;
            }

            if area.contains_rect(cell) {
                node.collect_all(out);
                continue;
            }

            out.extend(
                node.indices
                    .iter()
                    .copied()
                    .filter(|&index| area.contains(positions[index])),
            );
            pending.extend(node.children.iter().flatten().map(Box::as_ref));
        }
    }

    fn collect_all(&self, out: &mut Vec<usize>) {
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            out.extend(node.indices.iter().copied());
            pending.extend(node.children.iter().flatten().map(Box::as_ref));
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;

    #[test]
    fn query_matches_linear_scan() {
        let positions = (0..500)
            .map(|index| pos2((index % 25) as f32 * 13.0, (index / 25) as f32 * 7.0))
            .collect::<Vec<_>>();
        let tree = QuadNode::build(&positions).expect("non-empty");
        let area = Rect::from_min_max(pos2(40.0, 20.0), pos2(180.0, 90.0));

        let mut found = Vec::new();
        tree.query(area, &positions, &mut found);
        found.sort_unstable();

        let expected = (0..positions.len())
            .filter(|&index| area.contains(positions[index]))
            .collect::<Vec<_>>();
        assert_eq!(found, expected);
    }

    #[test]
    fn identical_points_stop_splitting() {
        let positions = vec![pos2(5.0, 5.0); 200];
        let tree = QuadNode::build(&positions).expect("non-empty");
        let mut found = Vec::new();
        tree.query(Rect::from_center_size(pos2(5.0, 5.0), Vec2::splat(1.0)), &positions, &mut found);
        assert_eq!(found.len(), 200);
    }

    #[test]
    fn empty_positions_build_nothing() {
        assert!(QuadNode::build(&[]).is_none());
    }
}
