use std::collections::HashMap;

use super::record::CommitRecord;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParentLink {
    pub index: usize,
    /// Position 0 in the commit's own parent list.
    pub is_primary: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModelAnomalies {
    pub dangling_parents: usize,
    pub duplicate_parents: usize,
    pub duplicate_commits: usize,
}

/// Index-based view of a commit list. Node `i` of the model is the `i`-th
/// distinct hash in input order; later duplicates of a hash are ignored.
#[derive(Clone, Debug, Default)]
pub struct GraphModel {
    ids: Vec<String>,
    record_indices: Vec<usize>,
    index_by_id: HashMap<String, usize>,
    parents: Vec<Vec<ParentLink>>,
    anomalies: ModelAnomalies,
}

impl GraphModel {
    pub fn build(commits: &[CommitRecord]) -> Self {
        let mut ids = Vec::with_capacity(commits.len());
        let mut record_indices = Vec::with_capacity(commits.len());
        let mut index_by_id = HashMap::with_capacity(commits.len());
        let mut anomalies = ModelAnomalies::default();

        for (record_index, commit) in commits.iter().enumerate() {
            if index_by_id.contains_key(&commit.hash) {
                anomalies.duplicate_commits += 1;
                continue;
            }
            index_by_id.insert(commit.hash.clone(), ids.len());
            ids.push(commit.hash.clone());
            record_indices.push(record_index);
        }

        let mut parents = Vec::with_capacity(ids.len());
        for &record_index in &record_indices {
            let commit = &commits[record_index];
            let mut links: Vec<ParentLink> = Vec::with_capacity(commit.parents.len());
            for (position, parent_id) in commit.parents.iter().enumerate() {
                let Some(&parent_index) = index_by_id.get(parent_id) else {
                    anomalies.dangling_parents += 1;
                    continue;
                };
                if links.iter().any(|link| link.index == parent_index) {
                    anomalies.duplicate_parents += 1;
                    continue;
                }
                links.push(ParentLink {
                    index: parent_index,
                    is_primary: position == 0,
                });
            }
            parents.push(links);
        }

        if anomalies.duplicate_commits > 0 {
            log::warn!(
                "ignored {} duplicate commit records",
                anomalies.duplicate_commits
            );
        }
        if anomalies.dangling_parents > 0 {
            log::debug!(
                "{} parent links point outside the loaded commit set",
                anomalies.dangling_parents
            );
        }

        Self {
            ids,
            record_indices,
            index_by_id,
            parents,
            anomalies,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_by_id.contains_key(id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn id(&self, index: usize) -> &str {
        &self.ids[index]
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn record<'a>(&self, commits: &'a [CommitRecord], index: usize) -> &'a CommitRecord {
        &commits[self.record_indices[index]]
    }

    /// Resolved parents, including self-references.
    pub fn raw_parents(&self, index: usize) -> &[ParentLink] {
        &self.parents[index]
    }

    /// Resolved parents without self-references.
    pub fn parents(&self, index: usize) -> impl Iterator<Item = ParentLink> + '_ {
        self.parents[index]
            .iter()
            .copied()
            .filter(move |link| link.index != index)
    }

    pub fn primary_parent(&self, index: usize) -> Option<usize> {
        self.parents(index)
            .find(|link| link.is_primary)
            .map(|link| link.index)
    }

    pub fn edge_count(&self) -> usize {
        (0..self.len()).map(|index| self.parents(index).count()).sum()
    }

    pub fn anomalies(&self) -> ModelAnomalies {
        self.anomalies
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_builds_empty_model() {
        let model = GraphModel::build(&[]);
        assert!(model.is_empty());
        assert_eq!(model.edge_count(), 0);
    }

    #[test]
    fn drops_parents_outside_loaded_set() {
        let commits = vec![
            CommitRecord::new("b", &["a", "not-loaded"]),
            CommitRecord::new("a", &[]),
        ];
        let model = GraphModel::build(&commits);

        let parents = model.parents(0).collect::<Vec<_>>();
        assert_eq!(
            parents,
            vec![ParentLink {
                index: 1,
                is_primary: true
            }]
        );
        assert_eq!(model.anomalies().dangling_parents, 1);
    }

    #[test]
    fn primary_flag_follows_original_position() {
        let commits = vec![
            CommitRecord::new("m", &["missing", "p2"]),
            CommitRecord::new("p2", &[]),
        ];
        let model = GraphModel::build(&commits);

        assert_eq!(model.primary_parent(0), None);
        assert!(!model.raw_parents(0)[0].is_primary);
    }

    #[test]
    fn self_references_are_kept_raw_but_filtered() {
        let commits = vec![CommitRecord::new("a", &["a"])];
        let model = GraphModel::build(&commits);

        assert_eq!(model.raw_parents(0).len(), 1);
        assert_eq!(model.parents(0).count(), 0);
    }

    #[test]
    fn duplicate_hashes_and_parents_are_ignored() {
        let commits = vec![
            CommitRecord::new("b", &["a", "a"]),
            CommitRecord::new("a", &[]),
            CommitRecord::new("b", &[]),
        ];
        let model = GraphModel::build(&commits);

        assert_eq!(model.len(), 2);
        assert_eq!(model.parents(0).count(), 1);
        assert_eq!(model.anomalies().duplicate_commits, 1);
        assert_eq!(model.anomalies().duplicate_parents, 1);
    }
}
