use std::collections::VecDeque;

use eframe::egui::Context;

use super::super::ViewModel;

const FRAME_WINDOW: usize = 180;

/// Rolling window of frame durations in milliseconds.
#[derive(Debug, Default)]
pub(in crate::app) struct FrameTimings {
    frames_ms: VecDeque<f32>,
}

impl FrameTimings {
    fn record(&mut self, dt_seconds: f32) {
        if dt_seconds <= f32::EPSILON {
            return;
        }
        self.frames_ms.push_back(dt_seconds * 1000.0);
        if self.frames_ms.len() > FRAME_WINDOW {
            self.frames_ms.pop_front();
        }
    }

    fn latest_ms(&self) -> Option<f32> {
        self.frames_ms.back().copied()
    }

    fn mean_ms(&self) -> Option<f32> {
        (!self.frames_ms.is_empty())
            .then(|| self.frames_ms.iter().sum::<f32>() / self.frames_ms.len() as f32)
    }

    /// Slowest frame in the window, which is the lowest frame rate.
    fn worst_ms(&self) -> Option<f32> {
        self.frames_ms.iter().copied().reduce(f32::max)
    }
}

fn per_second(frame_ms: f32) -> f32 {
    (1000.0 / frame_ms).min(1000.0)
}

impl ViewModel {
    pub(in crate::app) fn update_fps_counter(&mut self, ctx: &Context) {
        let dt = ctx.input(|input| input.stable_dt);
        self.frame_timings.record(dt);
    }

    pub(in crate::app) fn fps_display_text(&self) -> Option<String> {
        if !self.show_fps_bar {
            return None;
        }
        let timings = &self.frame_timings;

        let mut parts = Vec::new();
        if self.fps_show_current
            && let Some(latest) = timings.latest_ms()
        {
            parts.push(format!("FPS {:.0}", per_second(latest)));
        }
        if self.fps_show_average
            && let Some(mean) = timings.mean_ms()
        {
            parts.push(format!("avg {:.1}", per_second(mean)));
        }
        if self.fps_show_low
            && let Some(worst) = timings.worst_ms()
        {
            parts.push(format!("low {:.0}", per_second(worst)));
        }
        if self.fps_show_frame_time
            && let Some(latest) = timings.latest_ms()
        {
            parts.push(format!("{latest:.1} ms"));
        }
        if let Some(recompute) = self.last_recompute {
            parts.push(format!("layout {:.0} ms", recompute.as_secs_f32() * 1000.0));
        }

        (!parts.is_empty()).then(|| parts.join(" | "))
    }

    pub(in crate::app) fn visible_graph_text(&self) -> String {
        format!(
            "drawn: {} / {} commits, {} / {} edges",
            self.visible_node_count,
            self.snapshot.layout.nodes.len(),
            self.visible_edge_count,
            self.snapshot.layout.edges.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_keeps_latest_frames() {
        let mut timings = FrameTimings::default();
        for _ in 0..FRAME_WINDOW + 20 {
            timings.record(0.010);
        }
        timings.record(0.050);

        assert_eq!(timings.frames_ms.len(), FRAME_WINDOW);
        let latest = timings.latest_ms().unwrap_or_default();
        assert!((latest - 50.0).abs() < 1e-3);
        assert_eq!(timings.worst_ms(), timings.latest_ms());
    }

    #[test]
    fn zero_dt_is_ignored() {
        let mut timings = FrameTimings::default();
        timings.record(0.0);
        assert_eq!(timings.mean_ms(), None);
        assert_eq!(per_second(20.0), 50.0);
    }
}
