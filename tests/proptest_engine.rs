//! Property-based tests for the graph engine
//!
//! Histories are generated newest-first like `git log --topo-order`, with
//! optional dangling parents, self-references and parent cycles mixed in.

use std::collections::HashSet;

use commit_canvas::graph::{
    AuthorColorCache, ColorMode, CommitRecord, CommitRef, Direction, EngineConfig, GraphSnapshot,
    LayoutAlgorithm, RefKind, Viewport,
};
use eframe::egui::vec2;
use proptest::prelude::*;

// =============================================================================
// Strategy generators
// =============================================================================

/// Raw parent picks per commit. A pick is turned into a real parent by
/// `build_history`, so shrinking stays meaningful.
fn picks_strategy() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(prop::collection::vec(any::<u8>(), 0..4), 0..48)
}

fn direction_strategy() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Vertical), Just(Direction::Horizontal)]
}

/// `allow_back_edges` lets parents point at newer commits, which can close
/// cycles. Picks of 250 and up become dangling parents, 240..250 self-references.
fn build_history(picks: &[Vec<u8>], allow_back_edges: bool) -> Vec<CommitRecord> {
    let count = picks.len();
    picks
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let parents = raw
                .iter()
                .filter_map(|&pick| match pick {
                    250.. => Some(format!("gone{pick}")),
                    240..250 => Some(format!("c{index}")),
                    _ if allow_back_edges => Some(format!("c{}", pick as usize % count)),
                    _ => {
                        let older = count - index - 1;
                        (older > 0).then(|| format!("c{}", index + 1 + pick as usize % older))
                    }
                })
                .collect::<Vec<_>>();
            let parents = parents.iter().map(String::as_str).collect::<Vec<_>>();

            let mut commit = CommitRecord::new(format!("c{index}"), &parents)
                .with_author(&format!("dev{}", index % 3), &format!("dev{}@example.com", index % 3));
            if index % 7 == 0 {
                commit = commit.with_ref(CommitRef::new(format!("branch-{index}"), RefKind::LocalBranch));
            }
            if index % 11 == 5 {
                commit = commit.with_ref(CommitRef::new(format!("v{index}"), RefKind::Tag));
            }
            commit
        })
        .collect()
}

fn config(direction: Direction, color_mode: ColorMode) -> EngineConfig {
    let mut config = EngineConfig {
        color_mode,
        ..EngineConfig::default()
    };
    config.layout.direction = direction;
    config
}

fn snapshot(commits: &[CommitRecord], config: &EngineConfig) -> GraphSnapshot {
    GraphSnapshot::compute(commits, config, &mut AuthorColorCache::default())
}

// =============================================================================
// Layout properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Same input and config give the same layout and colors
    #[test]
    fn compute_is_deterministic(
        picks in picks_strategy(),
        back_edges in any::<bool>(),
        direction in direction_strategy(),
    ) {
        let commits = build_history(&picks, back_edges);
        let config = config(direction, ColorMode::Branch);

        let first = snapshot(&commits, &config);
        let second = snapshot(&commits, &config);

        prop_assert_eq!(&first.layout, &second.layout);
        prop_assert_eq!(first.colors.commit_colors(), second.colors.commit_colors());
    }

    /// Every edge joins two distinct loaded commits, once, in the parent direction
    #[test]
    fn edges_are_valid(picks in picks_strategy(), back_edges in any::<bool>()) {
        let commits = build_history(&picks, back_edges);
        let snap = snapshot(&commits, &EngineConfig::default());
        let layout = &snap.layout;

        prop_assert_eq!(layout.nodes.len(), commits.len());

        let mut seen = HashSet::new();
        for edge in &layout.edges {
            prop_assert!(edge.source < layout.nodes.len());
            prop_assert!(edge.target < layout.nodes.len());
            prop_assert_ne!(edge.source, edge.target);
            prop_assert!(seen.insert((edge.source, edge.target)));

            let child = &commits[edge.source];
            let parent_id = &layout.nodes[edge.target].id;
            prop_assert!(child.parents.contains(parent_id));
            prop_assert_eq!(edge.is_merge, child.parents.first() != Some(parent_id));
            prop_assert!(edge.route.len() >= 2);
        }
    }

    /// Acyclic histories below the threshold get the layered layout, with
    /// every parent on a deeper rank than its child
    #[test]
    fn layered_ranks_follow_parents(picks in picks_strategy(), direction in direction_strategy()) {
        let commits = build_history(&picks, false);
        let snap = snapshot(&commits, &config(direction, ColorMode::Branch));

        prop_assert_eq!(snap.layout.algorithm, LayoutAlgorithm::Layered);
        for edge in &snap.layout.edges {
            prop_assert!(snap.layout.nodes[edge.target].rank > snap.layout.nodes[edge.source].rank);
        }
    }

    /// A parent cycle never hangs or panics and always yields the fallback
    #[test]
    fn cycles_use_fallback(picks in picks_strategy()) {
        let commits = build_history(&picks, true);
        let snap = snapshot(&commits, &EngineConfig::default());

        if snap.cycle.has_cycle {
            prop_assert!(matches!(snap.layout.algorithm, LayoutAlgorithm::Fallback(_)));
        }
        prop_assert_eq!(snap.layout.nodes.len(), commits.len());
    }

    /// Every commit gets a color in both color modes
    #[test]
    fn every_commit_is_colored(picks in picks_strategy(), by_author in any::<bool>()) {
        let commits = build_history(&picks, false);
        let mode = if by_author { ColorMode::Author } else { ColorMode::Branch };
        let snap = snapshot(&commits, &config(Direction::Vertical, mode));

        prop_assert_eq!(snap.colors.commit_colors().len(), commits.len());
        for (index, node) in snap.layout.nodes.iter().enumerate() {
            prop_assert_eq!(node.color, snap.colors.commit_color(index));
            prop_assert_ne!(node.color.a(), 0);
        }
    }
}

// =============================================================================
// Viewport and highlight properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Culled nodes are exactly the nodes in the buffered rect, and kept
    /// edges have both endpoints kept
    #[test]
    fn culling_matches_linear_scan(
        picks in picks_strategy(),
        pan_x in -2_000.0f32..2_000.0,
        pan_y in -2_000.0f32..2_000.0,
        zoom in 0.05f32..4.0,
        buffer in 1.0f32..3.0,
    ) {
        let commits = build_history(&picks, false);
        let snap = snapshot(&commits, &EngineConfig::default());
        let viewport = Viewport::new(vec2(pan_x, pan_y), zoom, vec2(800.0, 600.0));

        let culled = snap.cull(&viewport, buffer);
        let area = viewport.buffered_world_rect(buffer);
        let expected = (0..snap.layout.nodes.len())
            .filter(|&node| area.contains(snap.layout.nodes[node].position))
            .collect::<Vec<_>>();
        prop_assert_eq!(&culled.nodes, &expected);

        let kept = culled.nodes.iter().copied().collect::<HashSet<_>>();
        for &edge in &culled.edges {
            let edge = &snap.layout.edges[edge];
            prop_assert!(kept.contains(&edge.source));
            prop_assert!(kept.contains(&edge.target));
        }
        let expected_edges = snap
            .layout
            .edges
            .iter()
            .filter(|edge| kept.contains(&edge.source) && kept.contains(&edge.target))
            .count();
        prop_assert_eq!(culled.edges.len(), expected_edges);
    }

    /// Highlighting a commit marks exactly its direct parents and children
    #[test]
    fn highlight_is_direct_neighbors(picks in picks_strategy(), back_edges in any::<bool>(), choice in any::<usize>()) {
        let commits = build_history(&picks, back_edges);
        prop_assume!(!commits.is_empty());
        let snap = snapshot(&commits, &EngineConfig::default());

        let selected = choice % commits.len();
        let expected = snap
            .layout
            .edges
            .iter()
            .filter_map(|edge| {
                if edge.source == selected {
                    Some(edge.target)
                } else if edge.target == selected {
                    Some(edge.source)
                } else {
                    None
                }
            })
            .collect::<HashSet<_>>();

        prop_assert_eq!(snap.highlight(&commits[selected].hash), expected);
        prop_assert!(snap.highlight("not-a-commit").is_empty());
    }
}
