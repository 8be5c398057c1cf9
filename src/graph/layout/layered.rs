use std::collections::VecDeque;

use crate::graph::model::GraphModel;

use super::{LayoutConfig, Placement};

/// Offset applied to nodes reached only through merge links so they settle
/// to the right of the first-parent chain.
const MERGE_ORDER_BIAS: f32 = 0.5;

pub(super) fn place(model: &GraphModel, config: &LayoutConfig) -> Placement {
    let node_count = model.len();
    let children = children_of(model);
    let ranks = assign_ranks(model);

    let mut layers = group_by_rank(&ranks);
    let mut slots = vec![0.0_f32; node_count];
    for layer in &layers {
        for (slot, &node) in layer.iter().enumerate() {
            slots[node] = slot as f32;
        }
    }

    order_layers(model, &children, &mut layers, &mut slots, config.crossing_sweeps);
    let cross = assign_cross_coordinates(model, &children, &layers, config.lane_pitch());

    let rank_pitch = config.rank_pitch();
    let positions = (0..node_count)
        .map(|node| config.place(ranks[node] as f32 * rank_pitch, cross[node]))
        .collect();

    Placement { positions, ranks }
}

fn children_of(model: &GraphModel) -> Vec<Vec<usize>> {
    let mut children = vec![Vec::new(); model.len()];
    for child in 0..model.len() {
        for link in model.parents(child) {
            children[link.index].push(child);
        }
    }
    children
}

/// Longest-path layering from the childless commits. Kahn's algorithm keeps
/// it iterative; a commit's rank is one past its deepest child.
fn assign_ranks(model: &GraphModel) -> Vec<usize> {
    let node_count = model.len();
    let mut pending_children = vec![0usize; node_count];
    for node in 0..node_count {
        for link in model.parents(node) {
            pending_children[link.index] += 1;
        }
    }

    let mut queue = (0..node_count)
        .filter(|&node| pending_children[node] == 0)
        .collect::<VecDeque<_>>();
    let mut ranks = vec![0usize; node_count];
    let mut processed = 0usize;

    while let Some(node) = queue.pop_front() {
        processed += 1;
        let next_rank = ranks[node] + 1;
        for link in model.parents(node) {
            let parent = link.index;
            ranks[parent] = ranks[parent].max(next_rank);
            pending_children[parent] -= 1;
            if pending_children[parent] == 0 {
                queue.push_back(parent);
            }
        }
    }

    if processed < node_count {
        log::warn!(
            "layered ranking left {} commits unranked",
            node_count - processed
        );
    }

    ranks
}

fn group_by_rank(ranks: &[usize]) -> Vec<Vec<usize>> {
    let max_rank = ranks.iter().copied().max().unwrap_or(0);
    let mut layers = vec![Vec::new(); max_rank + 1];
    for (node, &rank) in ranks.iter().enumerate() {
        layers[rank].push(node);
    }
    layers
}

fn order_layers(
    model: &GraphModel,
    children: &[Vec<usize>],
    layers: &mut [Vec<usize>],
    slots: &mut [f32],
    sweeps: usize,
) {
    for sweep in 0..sweeps {
        let downward = sweep % 2 == 0;
        let ranks: Vec<usize> = if downward {
            (1..layers.len()).collect()
        } else {
            (0..layers.len().saturating_sub(1)).rev().collect()
        };

        for rank in ranks {
            let mut keyed = layers[rank]
                .iter()
                .map(|&node| {
                    let key = if downward {
                        key_from_children(model, children, slots, node)
                    } else {
                        key_from_parents(model, slots, node)
                    };
                    (key.unwrap_or(slots[node]), slots[node], node)
                })
                .collect::<Vec<_>>();

            // Ties keep the previous sweep's order, then input order.
            keyed.sort_by(|a, b| {
                a.0.total_cmp(&b.0)
                    .then(a.1.total_cmp(&b.1))
                    .then(a.2.cmp(&b.2))
            });

            for (slot, (_, _, node)) in keyed.iter().enumerate() {
                layers[rank][slot] = *node;
                slots[*node] = slot as f32;
            }
        }
    }
}

fn key_from_children(
    model: &GraphModel,
    children: &[Vec<usize>],
    slots: &[f32],
    node: usize,
) -> Option<f32> {
    let child_list = &children[node];
    if child_list.is_empty() {
        return None;
    }

    let primary_slot = child_list
        .iter()
        .filter(|&&child| model.primary_parent(child) == Some(node))
        .map(|&child| slots[child])
        .min_by(f32::total_cmp);
    if primary_slot.is_some() {
        return primary_slot;
    }

    let sum = child_list.iter().map(|&child| slots[child]).sum::<f32>();
    Some(sum / child_list.len() as f32 + MERGE_ORDER_BIAS)
}

fn key_from_parents(model: &GraphModel, slots: &[f32], node: usize) -> Option<f32> {
    if let Some(primary) = model.primary_parent(node) {
        return Some(slots[primary]);
    }

    let (sum, count) = model
        .parents(node)
        .fold((0.0_f32, 0usize), |(sum, count), link| {
            (sum + slots[link.index], count + 1)
        });
    (count > 0).then(|| sum / count as f32)
}

/// Places each rank left to right. A commit lines up under the leftmost child
/// that continues through it as first parent, otherwise under the mean of its
/// children, and is pushed right just enough to keep one lane pitch from its
/// left neighbour.
fn assign_cross_coordinates(
    model: &GraphModel,
    children: &[Vec<usize>],
    layers: &[Vec<usize>],
    pitch: f32,
) -> Vec<f32> {
    let mut cross = vec![0.0_f32; model.len()];

    for layer in layers {
        let mut previous: Option<f32> = None;
        for (slot, &node) in layer.iter().enumerate() {
            let child_list = &children[node];
            let desired = child_list
                .iter()
                .filter(|&&child| model.primary_parent(child) == Some(node))
                .map(|&child| cross[child])
                .min_by(f32::total_cmp)
                .or_else(|| {
                    (!child_list.is_empty()).then(|| {
                        child_list.iter().map(|&child| cross[child]).sum::<f32>()
                            / child_list.len() as f32
                    })
                })
                .unwrap_or(slot as f32 * pitch);

            let placed = match previous {
                Some(left) => desired.max(left + pitch),
                None => desired,
            };
            cross[node] = placed;
            previous = Some(placed);
        }
    }

    let min_cross = cross.iter().copied().fold(f32::INFINITY, f32::min);
    if min_cross.is_finite() {
        for value in &mut cross {
            *value -= min_cross;
        }
    }
    cross
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::record::CommitRecord;

    #[test]
    fn ranks_follow_longest_path() {
        let commits = vec![
            CommitRecord::new("tip", &["mid", "root"]),
            CommitRecord::new("mid", &["root"]),
            CommitRecord::new("root", &[]),
        ];
        let ranks = assign_ranks(&GraphModel::build(&commits));
        assert_eq!(ranks, vec![0, 1, 2]);
    }

    #[test]
    fn independent_roots_share_rank_zero() {
        let commits = vec![CommitRecord::new("a", &[]), CommitRecord::new("b", &[])];
        let model = GraphModel::build(&commits);
        let placement = place(&model, &LayoutConfig::default());

        assert_eq!(placement.ranks, vec![0, 0]);
        let pitch = LayoutConfig::default().lane_pitch();
        assert_eq!(placement.positions[0].x, 0.0);
        assert_eq!(placement.positions[1].x, pitch);
    }

    #[test]
    fn merged_branch_sits_right_of_mainline() {
        let commits = vec![
            CommitRecord::new("m", &["a", "f"]),
            CommitRecord::new("f", &["base"]),
            CommitRecord::new("a", &["base"]),
            CommitRecord::new("base", &[]),
        ];
        let model = GraphModel::build(&commits);
        let placement = place(&model, &LayoutConfig::default());

        assert!(placement.positions[1].x > placement.positions[2].x);
    }
}
