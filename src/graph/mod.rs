//! Commit graph engine: model, cycle guard, colors, layout, adjacency and
//! viewport culling over one immutable commit snapshot.

use std::collections::HashSet;
use std::time::Instant;

use eframe::egui::Pos2;

pub mod adjacency;
pub mod color;
pub mod cull;
pub mod cycle;
pub mod layout;
pub mod model;
pub mod record;
pub mod stream;

pub use adjacency::AdjacencyIndex;
pub use color::{AuthorColorCache, ColorAssignment, ColorMode};
pub use cull::{CulledGraph, SpatialIndex, Viewport};
pub use cycle::CycleReport;
pub use layout::{
    Direction, GraphEdge, GraphNode, LayoutAlgorithm, LayoutConfig, LayoutResult, SizeClass,
};
pub use model::GraphModel;
pub use record::{Author, CommitRecord, CommitRef, RefKind};
pub use stream::{CommitStream, RecomputeThrottle};

pub const DEFAULT_CULL_BUFFER: f32 = 1.0;

#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    pub layout: LayoutConfig,
    pub color_mode: ColorMode,
    /// Viewport extents added on each side before culling; at least 1.0.
    pub cull_buffer: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            color_mode: ColorMode::Branch,
            cull_buffer: DEFAULT_CULL_BUFFER,
        }
    }
}

/// Everything derived from one commit list, computed together so the parts
/// never disagree about which commits exist.
#[derive(Debug)]
pub struct GraphSnapshot {
    /// Length of the commit list this snapshot was computed from.
    pub commit_count: usize,
    pub model: GraphModel,
    pub cycle: CycleReport,
    pub colors: ColorAssignment,
    pub layout: LayoutResult,
    pub adjacency: AdjacencyIndex,
    spatial: SpatialIndex,
}

impl Default for GraphSnapshot {
    fn default() -> Self {
        Self {
            commit_count: 0,
            model: GraphModel::default(),
            cycle: CycleReport::default(),
            colors: ColorAssignment::default(),
            layout: LayoutResult::empty(),
            adjacency: AdjacencyIndex::default(),
            spatial: SpatialIndex::default(),
        }
    }
}

impl GraphSnapshot {
    pub fn compute(
        commits: &[CommitRecord],
        config: &EngineConfig,
        author_cache: &mut AuthorColorCache,
    ) -> Self {
        let started = Instant::now();

        let model = GraphModel::build(commits);
        let cycle = cycle::check_cycles(&model);
        let colors = color::assign_colors(commits, &model, config.color_mode, author_cache);
        let layout = layout::layout_graph(&model, &colors, &cycle, &config.layout);
        let adjacency = AdjacencyIndex::build(&model);
        let spatial = SpatialIndex::build(&layout);

        log::debug!(
            "computed {} layout for {} commits, {} edges in {:?}",
            layout.algorithm.label(),
            model.len(),
            layout.edges.len(),
            started.elapsed()
        );

        Self {
            commit_count: commits.len(),
            model,
            cycle,
            colors,
            layout,
            adjacency,
            spatial,
        }
    }

    /// Node indices of the direct parents and children of `selected`.
    pub fn highlight(&self, selected: &str) -> HashSet<usize> {
        self.adjacency.highlight(selected)
    }

    pub fn cull(&self, viewport: &Viewport, buffer_factor: f32) -> CulledGraph {
        cull::cull(&self.layout, &self.spatial, viewport, buffer_factor)
    }

    /// Node under a world-space point, if any lies within `radius`.
    pub fn node_at(&self, world: Pos2, radius: f32) -> Option<usize> {
        self.spatial.nearest_within(world, radius)
    }

    pub fn record<'a>(&self, commits: &'a [CommitRecord], index: usize) -> &'a CommitRecord {
        self.model.record(commits, index)
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    #[test]
    fn three_commit_chain_end_to_end() {
        let commits = vec![
            CommitRecord::new("C3", &["C2"]).with_ref(CommitRef::new("main", RefKind::LocalBranch)),
            CommitRecord::new("C2", &["C1"]),
            CommitRecord::new("C1", &[]),
        ];
        let snapshot =
            GraphSnapshot::compute(&commits, &EngineConfig::default(), &mut AuthorColorCache::default());

        assert_eq!(snapshot.layout.nodes.len(), 3);
        assert_eq!(snapshot.layout.edges.len(), 2);
        assert_eq!(snapshot.layout.algorithm, LayoutAlgorithm::Layered);

        let ids = snapshot
            .highlight("C2")
            .into_iter()
            .map(|index| snapshot.model.id(index))
            .collect::<HashSet<_>>();
        assert_eq!(ids, HashSet::from(["C1", "C3"]));

        let main = snapshot.colors.ref_color("main").expect("main is colored");
        assert!(snapshot.layout.nodes.iter().all(|node| node.color == main));
    }

    #[test]
    fn snapshot_tracks_the_commit_count_it_came_from() {
        let commits = vec![CommitRecord::new("a", &[]), CommitRecord::new("a", &[])];
        let snapshot =
            GraphSnapshot::compute(&commits, &EngineConfig::default(), &mut AuthorColorCache::default());
        assert_eq!(snapshot.commit_count, 2);
        assert_eq!(snapshot.model.len(), 1);
    }

    #[test]
    fn culling_and_hit_testing_use_the_same_layout() {
        let commits = (0..50)
            .map(|index| {
                let parent = format!("c{}", index + 1);
                if index < 49 {
                    CommitRecord::new(format!("c{index}"), &[parent.as_str()])
                } else {
                    CommitRecord::new(format!("c{index}"), &[])
                }
            })
            .collect::<Vec<_>>();
        let snapshot =
            GraphSnapshot::compute(&commits, &EngineConfig::default(), &mut AuthorColorCache::default());

        let first = snapshot.layout.nodes[0].position;
        assert_eq!(snapshot.node_at(first, 4.0), Some(0));

        let viewport = Viewport::new(-first.to_vec2(), 1.0, vec2(200.0, 200.0));
        let culled = snapshot.cull(&viewport, 1.0);
        assert!(culled.nodes.contains(&0));
    }
}
