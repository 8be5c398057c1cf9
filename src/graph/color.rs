use std::collections::HashMap;

use eframe::egui::Color32;

use crate::util::stable_hash;

use super::model::GraphModel;
use super::record::CommitRecord;

pub const NEUTRAL_COLOR: Color32 = Color32::from_rgb(139, 148, 158);

pub const BRANCH_PALETTE: [Color32; 12] = [
    Color32::from_rgb(66, 133, 244),
    Color32::from_rgb(52, 168, 83),
    Color32::from_rgb(220, 38, 127),
    Color32::from_rgb(251, 188, 5),
    Color32::from_rgb(156, 39, 176),
    Color32::from_rgb(255, 87, 34),
    Color32::from_rgb(0, 172, 193),
    Color32::from_rgb(139, 195, 74),
    Color32::from_rgb(92, 107, 192),
    Color32::from_rgb(255, 183, 77),
    Color32::from_rgb(240, 98, 146),
    Color32::from_rgb(100, 181, 246),
];

const AUTHOR_SATURATION: f32 = 0.65;
const AUTHOR_LIGHTNESS: f32 = 0.55;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    #[default]
    Branch,
    Author,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColorAssignment {
    commit_colors: Vec<Color32>,
    ref_colors: HashMap<String, Color32>,
    /// Ref names in the order they first received a color.
    ref_order: Vec<String>,
}

impl ColorAssignment {
    pub fn commit_color(&self, index: usize) -> Color32 {
        self.commit_colors
            .get(index)
            .copied()
            .unwrap_or(NEUTRAL_COLOR)
    }

    pub fn commit_colors(&self) -> &[Color32] {
        &self.commit_colors
    }

    pub fn ref_color(&self, name: &str) -> Option<Color32> {
        self.ref_colors.get(name).copied()
    }

    pub fn legend(&self) -> impl Iterator<Item = (&str, Color32)> + '_ {
        self.ref_order
            .iter()
            .filter_map(|name| Some((name.as_str(), *self.ref_colors.get(name)?)))
    }

    fn grant_ref(&mut self, name: &str, color: Color32) {
        if self.ref_colors.contains_key(name) {
            return;
        }
        self.ref_colors.insert(name.to_owned(), color);
        self.ref_order.push(name.to_owned());
    }
}

/// Memoizes author colors by normalized email. Owned by the caller so it can
/// survive recomputes; the mapping itself never depends on it.
#[derive(Clone, Debug, Default)]
pub struct AuthorColorCache {
    colors: HashMap<String, Color32>,
}

impl AuthorColorCache {
    pub fn color_for(&mut self, email: &str) -> Color32 {
        let key = email.trim().to_lowercase();
        if let Some(color) = self.colors.get(&key) {
            return *color;
        }
        let color = author_color(&key);
        self.colors.insert(key, color);
        color
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

pub fn author_color(email: &str) -> Color32 {
    let key = email.trim().to_lowercase();
    let hue = (stable_hash(key.as_bytes()) % 360) as f32;
    hsl_to_color(hue, AUTHOR_SATURATION, AUTHOR_LIGHTNESS)
}

fn hsl_to_color(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = hue / 60.0;
    let x = chroma * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = lightness - chroma / 2.0;
    let channel = |value: f32| ((value + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Color32::from_rgb(channel(r), channel(g), channel(b))
}

pub fn assign_colors(
    commits: &[CommitRecord],
    model: &GraphModel,
    mode: ColorMode,
    author_cache: &mut AuthorColorCache,
) -> ColorAssignment {
    match mode {
        ColorMode::Branch => assign_branch_colors(commits, model),
        ColorMode::Author => assign_author_colors(commits, model, author_cache),
    }
}

/// Walks commits in model order (newest first from the history source) and
/// pushes each color down the first-parent chain until a colored commit is hit.
pub fn assign_branch_colors(commits: &[CommitRecord], model: &GraphModel) -> ColorAssignment {
    let node_count = model.len();
    let mut colors: Vec<Option<Color32>> = vec![None; node_count];
    let mut assignment = ColorAssignment::default();
    let mut next_palette_index = 0usize;

    for index in 0..node_count {
        let record = model.record(commits, index);

        let color = match colors[index] {
            Some(inherited) => {
                for commit_ref in record.refs.iter().filter(|r| r.kind.is_branch()) {
                    assignment.grant_ref(&commit_ref.name, inherited);
                }
                Some(inherited)
            }
            None if !record.refs.is_empty() => {
                let fresh = BRANCH_PALETTE[next_palette_index % BRANCH_PALETTE.len()];
                next_palette_index += 1;
                for commit_ref in &record.refs {
                    assignment.grant_ref(&commit_ref.name, fresh);
                }
                colors[index] = Some(fresh);
                Some(fresh)
            }
            None => None,
        };

        if let Some(color) = color
            && let Some(parent) = model.primary_parent(index)
            && colors[parent].is_none()
        {
            colors[parent] = Some(color);
        }
    }

    assignment.commit_colors = colors
        .into_iter()
        .map(|color| color.unwrap_or(NEUTRAL_COLOR))
        .collect();
    assignment
}

pub fn assign_author_colors(
    commits: &[CommitRecord],
    model: &GraphModel,
    author_cache: &mut AuthorColorCache,
) -> ColorAssignment {
    let commit_colors = (0..model.len())
        .map(|index| author_cache.color_for(&model.record(commits, index).author.email))
        .collect();

    ColorAssignment {
        commit_colors,
        ..ColorAssignment::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::record::{CommitRef, RefKind};

    fn branch_colors(commits: &[CommitRecord]) -> ColorAssignment {
        assign_branch_colors(commits, &GraphModel::build(commits))
    }

    #[test]
    fn first_parent_chain_shares_the_tip_color() {
        let commits = vec![
            CommitRecord::new("c3", &["c2"])
                .with_ref(CommitRef::new("main", RefKind::LocalBranch).head()),
            CommitRecord::new("c2", &["c1"]),
            CommitRecord::new("c1", &[]),
        ];
        let colors = branch_colors(&commits);

        let main = colors.ref_color("main").expect("main has a color");
        assert_eq!(colors.commit_colors(), &[main, main, main]);
        assert_ne!(main, NEUTRAL_COLOR);
    }

    #[test]
    fn side_branch_gets_its_own_hue_at_divergence() {
        let commits = vec![
            CommitRecord::new("m", &["a", "f"])
                .with_ref(CommitRef::new("main", RefKind::LocalBranch)),
            CommitRecord::new("a", &["base"]),
            CommitRecord::new("f", &["base"])
                .with_ref(CommitRef::new("feature", RefKind::LocalBranch)),
            CommitRecord::new("base", &[]),
        ];
        let colors = branch_colors(&commits);

        let main = colors.ref_color("main").expect("main colored");
        let feature = colors.ref_color("feature").expect("feature colored");
        assert_ne!(main, feature);
        assert_eq!(colors.commit_color(1), main);
        assert_eq!(colors.commit_color(3), main);
        assert_eq!(colors.commit_color(2), feature);
    }

    #[test]
    fn ref_on_inherited_commit_adopts_that_color() {
        let commits = vec![
            CommitRecord::new("c2", &["c1"])
                .with_ref(CommitRef::new("main", RefKind::LocalBranch)),
            CommitRecord::new("c1", &[])
                .with_ref(CommitRef::new("origin/main", RefKind::RemoteBranch)),
        ];
        let colors = branch_colors(&commits);
        assert_eq!(colors.ref_color("main"), colors.ref_color("origin/main"));
        let legend = colors.legend().map(|(name, _)| name).collect::<Vec<_>>();
        assert_eq!(legend, vec!["main", "origin/main"]);
    }

    #[test]
    fn unreferenced_tip_is_neutral() {
        let commits = vec![
            CommitRecord::new("orphan", &["base"]),
            CommitRecord::new("base", &[]),
        ];
        let colors = branch_colors(&commits);
        assert_eq!(colors.commit_colors(), &[NEUTRAL_COLOR, NEUTRAL_COLOR]);
    }

    #[test]
    fn palette_wraps_after_running_out() {
        let commits = (0..BRANCH_PALETTE.len() + 1)
            .map(|index| {
                CommitRecord::new(format!("c{index}"), &[])
                    .with_ref(CommitRef::new(format!("b{index}"), RefKind::LocalBranch))
            })
            .collect::<Vec<_>>();
        let colors = branch_colors(&commits);
        assert_eq!(colors.commit_color(BRANCH_PALETTE.len()), BRANCH_PALETTE[0]);
    }

    #[test]
    fn recoloring_is_idempotent() {
        let commits = vec![
            CommitRecord::new("m", &["a", "f"])
                .with_ref(CommitRef::new("main", RefKind::LocalBranch)),
            CommitRecord::new("f", &["a"]).with_ref(CommitRef::new("v1", RefKind::Tag)),
            CommitRecord::new("a", &[]),
        ];
        assert_eq!(branch_colors(&commits), branch_colors(&commits));
    }

    #[test]
    fn author_color_ignores_case_and_order() {
        let commits = vec![
            CommitRecord::new("a", &[]).with_author("Ada", "Ada@Example.com"),
            CommitRecord::new("b", &[]).with_author("Bob", "bob@example.com"),
            CommitRecord::new("c", &[]).with_author("Ada L.", "ada@example.com "),
        ];
        let model = GraphModel::build(&commits);
        let mut cache = AuthorColorCache::default();
        let colors = assign_author_colors(&commits, &model, &mut cache);

        assert_eq!(colors.commit_color(0), colors.commit_color(2));
        assert_eq!(colors.commit_color(0), author_color("ada@example.com"));
        assert_eq!(cache.len(), 2);

        let mut reversed = commits.clone();
        reversed.reverse();
        let reversed_colors =
            assign_author_colors(&reversed, &GraphModel::build(&reversed), &mut cache);
        assert_eq!(reversed_colors.commit_color(2), colors.commit_color(0));
    }

    #[test]
    fn hsl_conversion_hits_primaries() {
        assert_eq!(hsl_to_color(0.0, 1.0, 0.5), Color32::from_rgb(255, 0, 0));
        assert_eq!(hsl_to_color(120.0, 1.0, 0.5), Color32::from_rgb(0, 255, 0));
        assert_eq!(hsl_to_color(240.0, 1.0, 0.5), Color32::from_rgb(0, 0, 255));
    }
}
