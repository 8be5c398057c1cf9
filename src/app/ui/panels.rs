use std::time::Duration;

use eframe::egui::{self, Align, Context, Layout};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn show(&mut self, ctx: &Context, reload_requested: &mut bool) {
        self.update_fps_counter(ctx);
        self.poll_stream();
        self.maybe_recompute();

        let streaming = self.is_streaming();
        if streaming {
            ctx.request_repaint_after(Duration::from_millis(50));
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("commit-canvas");
                    ui.separator();
                    ui.label(self.source_label.as_str());
                    ui.label(format!("commits: {}", self.stream.len()));
                    ui.label(format!("edges: {}", self.snapshot.layout.edges.len()));
                    ui.label(format!("layout: {}", self.snapshot.layout.algorithm.label()));

                    if streaming {
                        match self.stream.progress() {
                            Some(fraction) => {
                                ui.add(
                                    egui::ProgressBar::new(fraction)
                                        .desired_width(120.0)
                                        .show_percentage(),
                                );
                            }
                            None => {
                                ui.spinner();
                            }
                        }
                    }

                    let reload_button =
                        ui.add_enabled(!streaming, egui::Button::new("Reload history"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    if ui.button("Fit view").clicked() {
                        self.fit_pending = true;
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.visible_graph_text());
                        if let Some(fps_text) = self.fps_display_text() {
                            ui.label(fps_text);
                        }
                    });
                });

                if let Some(error) = &self.stream_error {
                    ui.colored_label(
                        egui::Color32::from_rgb(240, 110, 100),
                        format!("History stream stopped early: {error}"),
                    );
                }
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));
    }
}
