use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Instant;

use eframe::egui::{Rect, Vec2, vec2};

use commit_canvas::graph::{
    AuthorColorCache, CommitStream, DEFAULT_CULL_BUFFER, Direction, GraphSnapshot,
    RecomputeThrottle,
};
use commit_canvas::history::HistoryEvent;
use commit_canvas::settings::Settings;

use super::super::{FrameTimings, ViewModel};

impl ViewModel {
    pub(in crate::app) const MIN_ZOOM: f32 = 0.02;
    pub(in crate::app) const MAX_ZOOM: f32 = 6.0;
    const MAX_FIT_ZOOM: f32 = 1.5;

    pub(in crate::app) fn new(
        source_label: String,
        settings: Settings,
        stream: CommitStream,
        stream_rx: Receiver<HistoryEvent>,
    ) -> Self {
        let stream_rx = (!stream.is_complete()).then_some(stream_rx);
        let mut model = Self {
            source_label,
            settings,
            stream,
            stream_rx,
            stream_error: None,
            throttle: RecomputeThrottle::default(),
            author_cache: AuthorColorCache::default(),
            filtered_commits: Vec::new(),
            snapshot: GraphSnapshot::default(),
            snapshot_dirty: true,
            snapshot_revision: 0,
            last_recompute: None,
            selected: None,
            search: String::new(),
            search_match_cache: None,
            pan: Vec2::ZERO,
            zoom: 1.0,
            fit_pending: true,
            cull_buffer: DEFAULT_CULL_BUFFER,
            show_minimap: true,
            show_fps_bar: true,
            fps_show_current: true,
            fps_show_average: true,
            fps_show_low: false,
            fps_show_frame_time: true,
            frame_timings: FrameTimings::default(),
            visible_node_count: 0,
            visible_edge_count: 0,
        };
        model.refresh_snapshot();
        model
    }

    /// Drops the loaded commits and starts over from a new worker.
    pub(in crate::app) fn restart_stream(&mut self, rx: Receiver<HistoryEvent>) {
        self.stream = CommitStream::new();
        self.stream_rx = Some(rx);
        self.stream_error = None;
        self.throttle.reset();
        self.fit_pending = true;
        self.snapshot_dirty = true;
    }

    pub(in crate::app) fn is_streaming(&self) -> bool {
        self.stream_rx.is_some()
    }

    pub(in crate::app) fn poll_stream(&mut self) {
        let Some(rx) = self.stream_rx.as_ref() else {
            return;
        };

        let mut finished = false;
        loop {
            match rx.try_recv() {
                Ok(HistoryEvent::Total(total)) => self.stream.set_expected_total(total),
                Ok(HistoryEvent::Chunk(chunk)) => {
                    self.stream.append(chunk);
                }
                Ok(HistoryEvent::Done) => {
                    self.stream.finish();
                    finished = true;
                    break;
                }
                Ok(HistoryEvent::Failed(error)) => {
                    self.stream_error = Some(error);
                    self.stream.finish();
                    finished = true;
                    break;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.stream_error = Some("Background load worker disconnected".to_owned());
                    self.stream.finish();
                    finished = true;
                    break;
                }
            }
        }

        if finished {
            self.stream_rx = None;
            log::info!(
                "history stream finished with {} commits ({} duplicates skipped)",
                self.stream.len(),
                self.stream.duplicates()
            );
        }
    }

    /// Recomputes when settings changed, or when the stream grew enough for
    /// the throttle to allow it.
    pub(in crate::app) fn maybe_recompute(&mut self) {
        let now = Instant::now();
        let grown = self.throttle.should_recompute(
            self.stream.len(),
            self.stream.is_complete(),
            now,
        );
        if self.snapshot_dirty || grown {
            self.refresh_snapshot();
        }
    }

    pub(in crate::app) fn refresh_snapshot(&mut self) {
        let started = Instant::now();
        self.filtered_commits = self.settings.filter_commits(self.stream.commits());
        let config = self.settings.engine_config();
        self.snapshot =
            GraphSnapshot::compute(&self.filtered_commits, &config, &mut self.author_cache);

        self.throttle.mark(self.stream.len(), Instant::now());
        self.snapshot_dirty = false;
        self.snapshot_revision = self.snapshot_revision.wrapping_add(1);
        self.search_match_cache = None;
        self.last_recompute = Some(started.elapsed());

        if let Some(selected) = &self.selected
            && self.snapshot.adjacency.index_of(selected).is_none()
        {
            self.selected = None;
        }
    }

    pub(in crate::app) fn mark_snapshot_dirty(&mut self) {
        self.snapshot_dirty = true;
        self.fit_pending = true;
    }

    /// Fits the cross axis of the layout to the canvas and scrolls to the
    /// newest commits.
    pub(in crate::app) fn fit_view(&mut self, canvas: Rect) {
        let bounds = self.snapshot.layout.bounds;
        if !bounds.is_positive() || !canvas.is_positive() {
            return;
        }

        let vertical = self.settings.direction == Direction::Vertical;
        let fit = if vertical {
            canvas.width() * 0.9 / bounds.width()
        } else {
            canvas.height() * 0.9 / bounds.height()
        };
        self.zoom = fit.clamp(Self::MIN_ZOOM, Self::MAX_FIT_ZOOM);

        let half_view = canvas.size() * 0.5 / self.zoom;
        let focus = if vertical {
            vec2(
                bounds.center().x,
                bounds.top() + half_view.y.min(bounds.height() * 0.5),
            )
        } else {
            vec2(
                bounds.left() + half_view.x.min(bounds.width() * 0.5),
                bounds.center().y,
            )
        };
        self.center_on(focus);
        self.fit_pending = false;
    }

    pub(in crate::app) fn center_on(&mut self, world: Vec2) {
        self.pan = -world * self.zoom;
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<String>) {
        if self.selected == selected {
            return;
        }
        self.selected = selected;
    }
}
