use eframe::egui::Pos2;

use super::LayoutConfig;

const CURVE_SAMPLES: usize = 8;

fn cubic(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let inverse = 1.0 - t;
    inverse * inverse * inverse * p0
        + 3.0 * inverse * inverse * t * p1
        + 3.0 * inverse * t * t * p2
        + t * t * t * p3
}

/// Straight when both ends share a lane. Otherwise one S-bend spanning at most
/// one rank: next to the child for merge links, next to the parent for the
/// first-parent link where a branch forks off.
pub(super) fn step_curve(
    source: Pos2,
    target: Pos2,
    is_merge: bool,
    config: &LayoutConfig,
) -> Vec<Pos2> {
    let (source_main, source_cross) = config.split(source);
    let (target_main, target_cross) = config.split(target);

    if (source_cross - target_cross).abs() < 0.5 {
        return vec![source, target];
    }

    let span = target_main - source_main;
    let bend = config.rank_pitch().min(span.abs()) * span.signum();
    let (bend_start, bend_end) = if is_merge {
        (source_main, source_main + bend)
    } else {
        (target_main - bend, target_main)
    };

    let mut points = Vec::with_capacity(CURVE_SAMPLES + 3);
    points.push(source);
    if bend_start != source_main {
        points.push(config.place(bend_start, source_cross));
    }

    let mid = (bend_start + bend_end) * 0.5;
    for step in 1..=CURVE_SAMPLES {
        let t = step as f32 / CURVE_SAMPLES as f32;
        let main = cubic(bend_start, mid, mid, bend_end, t);
        let cross = cubic(source_cross, source_cross, target_cross, target_cross, t);
        points.push(config.place(main, cross));
    }

    if bend_end != target_main {
        points.push(target);
    } else if let Some(last) = points.last_mut() {
        *last = target;
    }
    points
}

/// Fallback routing on a single column: adjacent rows connect straight, longer
/// links bow out sideways so they do not run through the nodes in between.
pub(super) fn side_arc(
    source: Pos2,
    target: Pos2,
    is_merge: bool,
    config: &LayoutConfig,
) -> Vec<Pos2> {
    let (source_main, source_cross) = config.split(source);
    let (target_main, target_cross) = config.split(target);

    if (target_main - source_main).abs() <= config.rank_pitch() + 0.5 {
        return vec![source, target];
    }

    let lanes = if is_merge { 1.0 } else { 0.6 };
    let offset = config.lane_pitch() * lanes;

    let mut points = Vec::with_capacity(CURVE_SAMPLES + 1);
    points.push(source);
    for step in 1..CURVE_SAMPLES {
        let t = step as f32 / CURVE_SAMPLES as f32;
        let main = cubic(source_main, source_main, target_main, target_main, t);
        let cross = cubic(
            source_cross,
            source_cross + offset,
            target_cross + offset,
            target_cross,
            t,
        );
        points.push(config.place(main, cross));
    }
    points.push(target);
    points
}
