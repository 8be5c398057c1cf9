use std::collections::HashMap;

use crate::graph::cycle::DEFAULT_LAYERED_THRESHOLD;
use crate::graph::layout::{Direction, LayoutConfig, SizeClass};
use crate::graph::record::CommitRecord;
use crate::graph::{ColorMode, DEFAULT_CULL_BUFFER, EngineConfig};

/// User-facing view options. Changing any of them replaces the snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub direction: Direction,
    pub compact: bool,
    pub color_by_author: bool,
    pub hide_merge_commits: bool,
    pub layered_threshold: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            direction: Direction::Vertical,
            compact: true,
            color_by_author: false,
            hide_merge_commits: false,
            layered_threshold: DEFAULT_LAYERED_THRESHOLD,
        }
    }
}

impl Settings {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            layout: LayoutConfig {
                direction: self.direction,
                size_class: if self.compact {
                    SizeClass::Compact
                } else {
                    SizeClass::Expanded
                },
                layered_threshold: self.layered_threshold,
                ..LayoutConfig::default()
            },
            color_mode: if self.color_by_author {
                ColorMode::Author
            } else {
                ColorMode::Branch
            },
            cull_buffer: DEFAULT_CULL_BUFFER,
        }
    }

    /// Commits the engine should see. With merges hidden, links into a hidden
    /// merge are redirected along its first-parent chain so history stays
    /// connected; refs on a hidden merge are dropped with it.
    pub fn filter_commits(&self, commits: &[CommitRecord]) -> Vec<CommitRecord> {
        if !self.hide_merge_commits {
            return commits.to_vec();
        }

        let merge_first_parent = commits
            .iter()
            .filter(|commit| commit.is_merge())
            .map(|commit| (commit.hash.as_str(), commit.parents[0].as_str()))
            .collect::<HashMap<_, _>>();

        let resolve = |start: &str| -> String {
            let mut current = start;
            let mut hops = 0usize;
            while let Some(&next) = merge_first_parent.get(current) {
                current = next;
                hops += 1;
                if hops > merge_first_parent.len() {
                    break;
                }
            }
            current.to_owned()
        };

        commits
            .iter()
            .filter(|commit| !commit.is_merge())
            .map(|commit| {
                let mut kept = commit.clone();
                let mut parents: Vec<String> = Vec::with_capacity(commit.parents.len());
                for parent in &commit.parents {
                    let resolved = resolve(parent);
                    if !parents.contains(&resolved) {
                        parents.push(resolved);
                    }
                }
                kept.parents = parents;
                kept
            })
            .collect()
    }
}
