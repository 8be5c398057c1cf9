use super::{LayoutConfig, Placement};

/// Single column in input order. Linear in time and memory whatever the shape.
pub(super) fn place(node_count: usize, config: &LayoutConfig) -> Placement {
    let rank_pitch = config.rank_pitch();
    let positions = (0..node_count)
        .map(|row| config.place(row as f32 * rank_pitch, 0.0))
        .collect();
    let ranks = (0..node_count).collect();

    Placement { positions, ranks }
}
