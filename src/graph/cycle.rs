use super::model::GraphModel;

/// Above this many commits the layered layout is skipped regardless of shape.
pub const DEFAULT_LAYERED_THRESHOLD: usize = 5_000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub has_cycle: bool,
    pub self_loops: usize,
    /// A commit found on the cycle, when one exists.
    pub cycle_at: Option<usize>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}

/// Iterative depth-first search over parent links. Memory beyond the mark
/// table is one stack frame per commit on the current path.
pub fn check_cycles(model: &GraphModel) -> CycleReport {
    let node_count = model.len();
    let mut marks = vec![Mark::Unvisited; node_count];
    let mut report = CycleReport::default();

    for index in 0..node_count {
        report.self_loops += model
            .raw_parents(index)
            .iter()
            .filter(|link| link.index == index)
            .count();
    }
    if report.self_loops > 0 {
        log::warn!("skipping {} self-referencing commits", report.self_loops);
    }

    let mut stack: Vec<(usize, usize)> = Vec::new();
    for root in 0..node_count {
        if marks[root] != Mark::Unvisited {
            continue;
        }

        marks[root] = Mark::OnPath;
        stack.push((root, 0));

        while let Some(frame) = stack.last_mut() {
            let (node, cursor) = *frame;
            let links = model.raw_parents(node);

            let Some(link) = links.get(cursor) else {
                marks[node] = Mark::Done;
                stack.pop();
                continue;
            };
            frame.1 += 1;

            let next = link.index;
            if next == node {
                continue;
            }

            match marks[next] {
                Mark::Unvisited => {
                    marks[next] = Mark::OnPath;
                    stack.push((next, 0));
                }
                Mark::OnPath => {
                    log::warn!(
                        "commit graph contains a cycle through {}",
                        model.id(next)
                    );
                    report.has_cycle = true;
                    report.cycle_at = Some(next);
                    return report;
                }
                Mark::Done => {}
            }
        }
    }

    report
}

pub fn has_cycle(model: &GraphModel) -> bool {
    check_cycles(model).has_cycle
}

pub fn should_fallback(report: &CycleReport, commit_count: usize, threshold: usize) -> bool {
    report.has_cycle || commit_count > threshold
}
