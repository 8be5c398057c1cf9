use std::collections::HashSet;
use std::time::{Duration, Instant};

use super::record::CommitRecord;

/// Commits accumulated across streamed chunks. Append-only: a commit once
/// accepted keeps its position, repeated hashes are skipped.
#[derive(Clone, Debug, Default)]
pub struct CommitStream {
    commits: Vec<CommitRecord>,
    seen: HashSet<String>,
    expected_total: Option<usize>,
    complete: bool,
    duplicates: usize,
}

impl CommitStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_expected_total(total: usize) -> Self {
        Self {
            expected_total: Some(total),
            ..Self::default()
        }
    }

    /// Returns how many commits of `chunk` were new.
    pub fn append(&mut self, chunk: Vec<CommitRecord>) -> usize {
        if self.complete {
            log::warn!("dropping {} commits received after completion", chunk.len());
            return 0;
        }

        let before = self.commits.len();
        for commit in chunk {
            if self.seen.insert(commit.hash.clone()) {
                self.commits.push(commit);
            } else {
                self.duplicates += 1;
            }
        }
        self.commits.len() - before
    }

    pub fn finish(&mut self) {
        self.complete = true;
    }

    pub fn set_expected_total(&mut self, total: usize) {
        self.expected_total = Some(total);
    }

    pub fn commits(&self) -> &[CommitRecord] {
        &self.commits
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn expected_total(&self) -> Option<usize> {
        self.expected_total
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Loaded fraction in `0.0..=1.0` when a total is known.
    pub fn progress(&self) -> Option<f32> {
        if self.complete {
            return Some(1.0);
        }
        self.expected_total
            .filter(|&total| total > 0)
            .map(|total| (self.commits.len() as f32 / total as f32).min(1.0))
    }
}

/// Decides when a growing commit set is worth a full recompute.
#[derive(Clone, Debug)]
pub struct RecomputeThrottle {
    pub min_interval: Duration,
    pub min_delta: usize,
    last_at: Option<Instant>,
    last_count: Option<usize>,
}

impl Default for RecomputeThrottle {
    fn default() -> Self {
        Self::new(Duration::from_millis(250), 2_000)
    }
}

impl RecomputeThrottle {
    pub fn new(min_interval: Duration, min_delta: usize) -> Self {
        Self {
            min_interval,
            min_delta: min_delta.max(1),
            last_at: None,
            last_count: None,
        }
    }

    pub fn should_recompute(&self, count: usize, complete: bool, now: Instant) -> bool {
        let Some(last_count) = self.last_count else {
            return count > 0 || complete;
        };
        if count == last_count {
            return false;
        }
        if complete {
            return true;
        }

        let delta = count.abs_diff(last_count);
        let elapsed = self
            .last_at
            .map(|at| now.saturating_duration_since(at))
            .unwrap_or(Duration::MAX);
        elapsed >= self.min_interval || delta >= self.min_delta
    }

    pub fn mark(&mut self, count: usize, now: Instant) {
        self.last_at = Some(now);
        self.last_count = Some(count);
    }

    pub fn last_count(&self) -> Option<usize> {
        self.last_count
    }

    pub fn reset(&mut self) {
        self.last_at = None;
        self.last_count = None;
    }
}
