use eframe::egui::{Pos2, Rect, Vec2, vec2};

use super::layout::LayoutResult;

mod quadtree;

use quadtree::QuadNode;

pub const MIN_ZOOM: f32 = 0.01;
pub const MIN_BUFFER_FACTOR: f32 = 1.0;

/// Pan and zoom of the canvas for one frame. Screen coordinates are relative
/// to the canvas top-left corner; world origin sits at the canvas center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub pan: Vec2,
    pub zoom: f32,
    pub screen_size: Vec2,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
            screen_size: vec2(1280.0, 800.0),
        }
    }
}

impl Viewport {
    pub fn new(pan: Vec2, zoom: f32, screen_size: Vec2) -> Self {
        Self {
            pan,
            zoom,
            screen_size,
        }
    }

    pub fn effective_zoom(&self) -> f32 {
        if self.zoom.is_finite() {
            self.zoom.max(MIN_ZOOM)
        } else {
            1.0
        }
    }

    pub fn world_to_screen(&self, world: Pos2) -> Pos2 {
        (self.screen_size * 0.5 + self.pan + world.to_vec2() * self.effective_zoom()).to_pos2()
    }

    pub fn screen_to_world(&self, screen: Pos2) -> Pos2 {
        ((screen.to_vec2() - self.screen_size * 0.5 - self.pan) / self.effective_zoom()).to_pos2()
    }

    /// The part of the world the screen currently shows.
    pub fn visible_world_rect(&self) -> Rect {
        let size = vec2(self.screen_size.x.max(0.0), self.screen_size.y.max(0.0));
        Rect::from_two_pos(
            self.screen_to_world(Pos2::ZERO),
            self.screen_to_world(size.to_pos2()),
        )
    }

    /// Visible rect grown by `factor` viewport extents on every side.
    pub fn buffered_world_rect(&self, factor: f32) -> Rect {
        let visible = self.visible_world_rect();
        let factor = if factor.is_finite() {
            factor.max(MIN_BUFFER_FACTOR)
        } else {
            MIN_BUFFER_FACTOR
        };
        visible.expand2(visible.size() * factor)
    }
}

/// Indices into a `LayoutResult` that survive culling.
#[derive(Clone, Debug, PartialEq)]
pub struct CulledGraph {
    /// Ascending node indices.
    pub nodes: Vec<usize>,
    /// Ascending edge indices; both endpoints are in `nodes`.
    pub edges: Vec<usize>,
    pub world_rect: Rect,
}

impl Default for CulledGraph {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            world_rect: Rect::NOTHING,
        }
    }
}

impl CulledGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Point index over node centers of one layout.
#[derive(Debug, Default)]
pub struct SpatialIndex {
    positions: Vec<Pos2>,
    root: Option<QuadNode>,
}

impl SpatialIndex {
    pub fn build(layout: &LayoutResult) -> Self {
        let positions = layout
            .nodes
            .iter()
            .map(|node| node.position)
            .collect::<Vec<_>>();
        let root = QuadNode::build(&positions);
        Self { positions, root }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Node indices whose center lies in `area`, ascending.
    pub fn query(&self, area: Rect) -> Vec<usize> {
        let mut found = Vec::new();
        if let Some(root) = &self.root {
            root.query(area, &self.positions, &mut found);
        }
        found.sort_unstable();
        found
    }

    /// Nearest node whose center is within `radius` of `point`.
    pub fn nearest_within(&self, point: Pos2, radius: f32) -> Option<usize> {
        let area = Rect::from_center_size(point, Vec2::splat(radius * 2.0));
        self.query(area)
            .into_iter()
            .map(|index| (index, self.positions[index].distance_sq(point)))
            .filter(|(_, distance)| *distance <= radius * radius)
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .map(|(index, _)| index)
    }
}

/// Keeps the nodes inside the buffered viewport and the edges whose two
/// endpoints were both kept.
pub fn cull(
    layout: &LayoutResult,
    index: &SpatialIndex,
    viewport: &Viewport,
    buffer_factor: f32,
) -> CulledGraph {
    let world_rect = viewport.buffered_world_rect(buffer_factor);
    let nodes = if index.len() == layout.nodes.len() {
        index.query(world_rect)
    } else {
        log::debug!("spatial index is stale, culling by linear scan");
        (0..layout.nodes.len())
            .filter(|&node| world_rect.contains(layout.nodes[node].position))
            .collect()
    };

    let mut kept = vec![false; layout.nodes.len()];
    for &node in &nodes {
        kept[node] = true;
    }

    let mut edges = nodes
        .iter()
        .flat_map(|&node| layout.outgoing_edges(node).iter().copied())
        .filter(|&edge| kept[layout.edges[edge].target])
        .collect::<Vec<_>>();
    edges.sort_unstable();

    CulledGraph {
        nodes,
        edges,
        world_rect,
    }
}
