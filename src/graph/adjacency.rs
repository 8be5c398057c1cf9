use std::collections::{HashMap, HashSet};

use super::model::GraphModel;

/// Direct parent/child lookups for one commit snapshot. Rebuilt whenever the
/// commit set changes, never on selection.
#[derive(Clone, Debug, Default)]
pub struct AdjacencyIndex {
    ids: Vec<String>,
    index_by_id: HashMap<String, usize>,
    parents: Vec<Vec<usize>>,
    children: Vec<Vec<usize>>,
}

impl AdjacencyIndex {
    pub fn build(model: &GraphModel) -> Self {
        let node_count = model.len();
        let mut parents = Vec::with_capacity(node_count);
        let mut children = vec![Vec::new(); node_count];

        for child in 0..node_count {
            let links = model
                .parents(child)
                .map(|link| link.index)
                .collect::<Vec<_>>();
            for &parent in &links {
                children[parent].push(child);
            }
            parents.push(links);
        }

        let index_by_id = model
            .ids()
            .iter()
            .enumerate()
            .map(|(index, id)| (id.clone(), index))
            .collect();

        Self {
            ids: model.ids().to_vec(),
            index_by_id,
            parents,
            children,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn id(&self, index: usize) -> &str {
        &self.ids[index]
    }

    /// Parents in the commit's own order.
    pub fn parents_of(&self, index: usize) -> &[usize] {
        self.parents.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Children in input order.
    pub fn children_of(&self, index: usize) -> &[usize] {
        self.children.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn degree(&self, index: usize) -> usize {
        self.parents_of(index).len() + self.children_of(index).len()
    }

    /// Direct parents and children of `selected`; cost depends only on its degree.
    pub fn highlight(&self, selected: &str) -> HashSet<usize> {
        let Some(index) = self.index_of(selected) else {
            return HashSet::new();
        };
        self.highlight_index(index)
    }

    pub fn highlight_index(&self, index: usize) -> HashSet<usize> {
        let mut related = HashSet::with_capacity(self.degree(index));
        related.extend(self.parents_of(index).iter().copied());
        related.extend(self.children_of(index).iter().copied());
        related
    }

    pub fn highlight_ids(&self, selected: &str) -> HashSet<&str> {
        self.highlight(selected)
            .into_iter()
            .map(|index| self.id(index))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::graph::record::CommitRecord;

    fn index_of(commits: &[CommitRecord]) -> AdjacencyIndex {
        AdjacencyIndex::build(&GraphModel::build(commits))
    }

    fn linear_history(count: usize) -> Vec<CommitRecord> {
        (0..count)
            .map(|index| {
                let parent = format!("c{}", index + 1);
                if index + 1 < count {
                    CommitRecord::new(format!("c{index}"), &[parent.as_str()])
                } else {
                    CommitRecord::new(format!("c{index}"), &[])
                }
            })
            .collect()
    }

    #[test]
    fn selecting_middle_commit_highlights_both_neighbours() {
        let commits = vec![
            CommitRecord::new("C3", &["C2"]),
            CommitRecord::new("C2", &["C1"]),
            CommitRecord::new("C1", &[]),
        ];
        let index = index_of(&commits);
        assert_eq!(index.highlight_ids("C2"), HashSet::from(["C1", "C3"]));
    }

    #[test]
    fn merge_highlights_all_parents_and_children() {
        let commits = vec![
            CommitRecord::new("child", &["m"]),
            CommitRecord::new("m", &["p1", "p2", "m", "missing"]),
            CommitRecord::new("p1", &[]),
            CommitRecord::new("p2", &[]),
        ];
        let index = index_of(&commits);
        assert_eq!(
            index.highlight_ids("m"),
            HashSet::from(["child", "p1", "p2"])
        );
        assert_eq!(index.parents_of(1), &[2, 3]);
    }

    #[test]
    fn unknown_selection_highlights_nothing() {
        let index = index_of(&linear_history(3));
        assert!(index.highlight("nope").is_empty());
    }

    fn average_query_time(count: usize) -> Duration {
        const QUERIES: u32 = 2_000;
        let index = index_of(&linear_history(count));
        let selected = format!("c{}", count / 2);

        let started = Instant::now();
        for _ in 0..QUERIES {
            assert_eq!(index.highlight(&selected).len(), 2);
        }
        started.elapsed() / QUERIES
    }

    #[test]
    fn highlight_cost_does_not_grow_with_history_size() {
        let small = average_query_time(100);
        let medium = average_query_time(10_000);
        let large = average_query_time(100_000);

        // Generous bound: a scan over all commits would be three orders of
        // magnitude slower at 100k than at 100.
        let ceiling = small.max(Duration::from_micros(2)) * 50;
        assert!(medium < ceiling, "10k query took {medium:?}, 100 took {small:?}");
        assert!(large < ceiling, "100k query took {large:?}, 100 took {small:?}");
    }
}
