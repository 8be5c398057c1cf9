use std::collections::HashMap;

use eframe::egui::{Color32, Pos2, Rect, Vec2, pos2, vec2};

use super::color::ColorAssignment;
use super::cycle::{CycleReport, DEFAULT_LAYERED_THRESHOLD, should_fallback};
use super::model::GraphModel;

mod fallback;
mod layered;
mod route;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    /// Ranks run down the y axis, newest commits at the top.
    #[default]
    Vertical,
    /// Ranks run along the x axis, newest commits on the left.
    Horizontal,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SizeClass {
    #[default]
    Compact,
    Expanded,
}

impl SizeClass {
    pub fn node_size(self) -> Vec2 {
        match self {
            Self::Compact => vec2(18.0, 18.0),
            Self::Expanded => vec2(210.0, 44.0),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
    pub direction: Direction,
    pub size_class: SizeClass,
    /// Gap between neighbouring nodes of one rank.
    pub node_spacing: f32,
    /// Gap between consecutive ranks.
    pub rank_spacing: f32,
    pub layered_threshold: usize,
    pub crossing_sweeps: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            direction: Direction::Vertical,
            size_class: SizeClass::Compact,
            node_spacing: 26.0,
            rank_spacing: 30.0,
            layered_threshold: DEFAULT_LAYERED_THRESHOLD,
            crossing_sweeps: 4,
        }
    }
}

impl LayoutConfig {
    fn main_extent(&self) -> f32 {
        let size = self.size_class.node_size();
        match self.direction {
            Direction::Vertical => size.y,
            Direction::Horizontal => size.x,
        }
    }

    fn cross_extent(&self) -> f32 {
        let size = self.size_class.node_size();
        match self.direction {
            Direction::Vertical => size.x,
            Direction::Horizontal => size.y,
        }
    }

    pub fn rank_pitch(&self) -> f32 {
        self.main_extent() + self.rank_spacing.max(0.0)
    }

    pub fn lane_pitch(&self) -> f32 {
        self.cross_extent() + self.node_spacing.max(0.0)
    }

    fn place(&self, main: f32, cross: f32) -> Pos2 {
        match self.direction {
            Direction::Vertical => pos2(cross, main),
            Direction::Horizontal => pos2(main, cross),
        }
    }

    fn split(&self, position: Pos2) -> (f32, f32) {
        match self.direction {
            Direction::Vertical => (position.y, position.x),
            Direction::Horizontal => (position.x, position.y),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FallbackReason {
    Cycle,
    TooLarge,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutAlgorithm {
    Layered,
    Fallback(FallbackReason),
}

impl LayoutAlgorithm {
    pub fn label(self) -> &'static str {
        match self {
            Self::Layered => "layered",
            Self::Fallback(FallbackReason::Cycle) => "linear (cycle detected)",
            Self::Fallback(FallbackReason::TooLarge) => "linear (large history)",
        }
    }
}

pub fn choose_algorithm(report: &CycleReport, commit_count: usize, threshold: usize) -> LayoutAlgorithm {
    if !should_fallback(report, commit_count, threshold) {
        LayoutAlgorithm::Layered
    } else if report.has_cycle {
        LayoutAlgorithm::Fallback(FallbackReason::Cycle)
    } else {
        LayoutAlgorithm::Fallback(FallbackReason::TooLarge)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
    pub id: String,
    pub color: Color32,
    /// Node center in world space.
    pub position: Pos2,
    pub rank: usize,
    pub compact: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphEdge {
    /// Child commit.
    pub source: usize,
    /// Parent commit.
    pub target: usize,
    pub color: Color32,
    pub is_merge: bool,
    pub route: Vec<Pos2>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutResult {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub bounds: Rect,
    pub node_size: Vec2,
    pub algorithm: LayoutAlgorithm,
    index_by_id: HashMap<String, usize>,
    outgoing: Vec<Vec<usize>>,
}

impl LayoutResult {
    pub fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            bounds: Rect::ZERO,
            node_size: SizeClass::default().node_size(),
            algorithm: LayoutAlgorithm::Layered,
            index_by_id: HashMap::new(),
            outgoing: Vec::new(),
        }
    }

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.node_index(id).map(|index| &self.nodes[index])
    }

    /// Indices into `edges` whose source is `node`.
    pub fn outgoing_edges(&self, node: usize) -> &[usize] {
        self.outgoing.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Lays out every commit in `model`. Node `i` of the result is node `i` of the model.
pub fn layout_graph(
    model: &GraphModel,
    colors: &ColorAssignment,
    report: &CycleReport,
    config: &LayoutConfig,
) -> LayoutResult {
    if model.is_empty() {
        return LayoutResult {
            node_size: config.size_class.node_size(),
            ..LayoutResult::empty()
        };
    }

    let algorithm = choose_algorithm(report, model.len(), config.layered_threshold);
    let placement = match algorithm {
        LayoutAlgorithm::Layered => layered::place(model, config),
        LayoutAlgorithm::Fallback(reason) => {
            log::debug!(
                "using linear layout for {} commits ({reason:?})",
                model.len()
            );
            fallback::place(model.len(), config)
        }
    };

    let compact = config.size_class == SizeClass::Compact;
    let nodes = (0..model.len())
        .map(|index| GraphNode {
            id: model.id(index).to_owned(),
            color: colors.commit_color(index),
            position: placement.positions[index],
            rank: placement.ranks[index],
            compact,
        })
        .collect::<Vec<_>>();

    let mut edges = build_edges(model, colors);
    for edge in &mut edges {
        let source = nodes[edge.source].position;
        let target = nodes[edge.target].position;
        edge.route = match algorithm {
            LayoutAlgorithm::Layered => route::step_curve(source, target, edge.is_merge, config),
            LayoutAlgorithm::Fallback(_) => route::side_arc(source, target, edge.is_merge, config),
        };
    }

    let mut outgoing = vec![Vec::new(); nodes.len()];
    for (edge_index, edge) in edges.iter().enumerate() {
        outgoing[edge.source].push(edge_index);
    }

    let node_size = config.size_class.node_size();
    let index_by_id = nodes
        .iter()
        .enumerate()
        .map(|(index, node)| (node.id.clone(), index))
        .collect();

    LayoutResult {
        bounds: compute_bounds(&nodes, node_size),
        nodes,
        edges,
        node_size,
        algorithm,
        index_by_id,
        outgoing,
    }
}

/// One edge per distinct child -> parent pair inside the model. Self-references
/// and parents outside the loaded set never produce edges.
pub fn build_edges(model: &GraphModel, colors: &ColorAssignment) -> Vec<GraphEdge> {
    let mut edges = Vec::with_capacity(model.edge_count());
    for source in 0..model.len() {
        let color = colors.commit_color(source);
        for link in model.parents(source) {
            edges.push(GraphEdge {
                source,
                target: link.index,
                color,
                is_merge: !link.is_primary,
                route: Vec::new(),
            });
        }
    }
    edges
}

fn compute_bounds(nodes: &[GraphNode], node_size: Vec2) -> Rect {
    let mut bounds = Rect::NOTHING;
    for node in nodes {
        bounds = bounds.union(Rect::from_center_size(node.position, node_size));
    }
    if bounds.is_positive() { bounds } else { Rect::ZERO }
}

struct Placement {
    positions: Vec<Pos2>,
    ranks: Vec<usize>,
}
