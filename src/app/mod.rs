use std::collections::HashSet;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

use eframe::egui::{self, Context, Vec2};

use commit_canvas::graph::{
    AuthorColorCache, CommitRecord, CommitStream, GraphSnapshot, RecomputeThrottle,
};
use commit_canvas::history::{HistoryEvent, HistorySource, spawn_stream};
use commit_canvas::settings::Settings;

mod graph;
mod render_utils;
mod ui;

use ui::FrameTimings;

pub struct CommitCanvasApp {
    source: HistorySource,
    chunk_size: usize,
    settings: Settings,
    state: AppState,
}

enum AppState {
    Loading {
        rx: Receiver<HistoryEvent>,
        pending: CommitStream,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    source_label: String,
    settings: Settings,
    stream: CommitStream,
    stream_rx: Option<Receiver<HistoryEvent>>,
    stream_error: Option<String>,
    throttle: RecomputeThrottle,
    author_cache: AuthorColorCache,
    filtered_commits: Vec<CommitRecord>,
    snapshot: GraphSnapshot,
    snapshot_dirty: bool,
    snapshot_revision: u64,
    last_recompute: Option<Duration>,
    selected: Option<String>,
    search: String,
    search_match_cache: Option<SearchMatchCache>,
    pan: Vec2,
    zoom: f32,
    fit_pending: bool,
    cull_buffer: f32,
    show_minimap: bool,
    show_fps_bar: bool,
    fps_show_current: bool,
    fps_show_average: bool,
    fps_show_low: bool,
    fps_show_frame_time: bool,
    frame_timings: FrameTimings,
    visible_node_count: usize,
    visible_edge_count: usize,
}

struct SearchMatchCache {
    query: String,
    snapshot_revision: u64,
    matches: Arc<HashSet<usize>>,
}

impl CommitCanvasApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        source: HistorySource,
        chunk_size: usize,
        settings: Settings,
    ) -> Self {
        let state = Self::start_load(&source, chunk_size);
        Self {
            source,
            chunk_size,
            settings,
            state,
        }
    }

    fn start_load(source: &HistorySource, chunk_size: usize) -> AppState {
        log::info!("loading {}", source.describe());
        AppState::Loading {
            rx: spawn_stream(source.clone(), chunk_size),
            pending: CommitStream::new(),
        }
    }

    /// Drains the worker until the first commits arrive. `Some` once there is
    /// something to show or the load has failed.
    fn poll_loading(
        rx: &Receiver<HistoryEvent>,
        pending: &mut CommitStream,
    ) -> Option<Result<(), String>> {
        loop {
            match rx.try_recv() {
                Ok(HistoryEvent::Total(total)) => pending.set_expected_total(total),
                Ok(HistoryEvent::Chunk(chunk)) => {
                    pending.append(chunk);
                    return Some(Ok(()));
                }
                Ok(HistoryEvent::Done) => {
                    pending.finish();
                    return Some(if pending.is_empty() {
                        Err("The history source returned no commits".to_owned())
                    } else {
                        Ok(())
                    });
                }
                Ok(HistoryEvent::Failed(error)) => return Some(Err(error)),
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => {
                    return Some(Err("Background load worker disconnected".to_owned()));
                }
            }
        }
    }

    fn promote_loaded(&mut self) {
        let previous = std::mem::replace(&mut self.state, AppState::Error(String::new()));
        self.state = match previous {
            AppState::Loading { rx, pending } => AppState::Ready(Box::new(ViewModel::new(
                self.source.describe(),
                self.settings.clone(),
                pending,
                rx,
            ))),
            other => other,
        };
    }
}

impl eframe::App for CommitCanvasApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let mut loaded = false;

        match &mut self.state {
            AppState::Loading { rx, pending } => {
                match Self::poll_loading(rx, pending) {
                    Some(Ok(())) => loaded = true,
                    Some(Err(error)) => transition = Some(AppState::Error(error)),
                    None => {}
                }

                let progress = pending.progress();
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading commit history...");
                        ui.add_space(8.0);
                        ui.label(self.source.describe());
                        ui.add_space(8.0);
                        match progress {
                            Some(fraction) => {
                                ui.add(egui::ProgressBar::new(fraction).desired_width(320.0));
                            }
                            None => {
                                ui.spinner();
                            }
                        }
                    });
                });
                ctx.request_repaint_after(Duration::from_millis(50));
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load commit history");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(&self.source, self.chunk_size));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                model.show(ctx, &mut reload_requested);
                self.settings = model.settings.clone();

                if reload_requested {
                    log::info!("reloading {}", self.source.describe());
                    model.restart_stream(spawn_stream(self.source.clone(), self.chunk_size));
                }
            }
        }

        if let Some(next_state) = transition {
            self.state = next_state;
        } else if loaded {
            self.promote_loaded();
            ctx.request_repaint();
        }
    }
}
