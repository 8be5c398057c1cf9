use eframe::egui::{self, RichText, Ui};

use commit_canvas::graph::cull::MIN_BUFFER_FACTOR;
use commit_canvas::graph::{Direction, LayoutAlgorithm};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Graph Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search (hash, subject, author or ref)")
            .on_hover_text("Highlight matching commits without changing the layout.");
        ui.text_edit_singleline(&mut self.search);
        if let Some(cache) = &self.search_match_cache
            && !self.search.trim().is_empty()
        {
            ui.small(format!("{} matching commits", cache.matches.len()));
        }

        ui.separator();

        let mut changed = false;
        ui.label(RichText::new("Layout").strong());
        ui.horizontal(|ui| {
            changed |= ui
                .selectable_value(&mut self.settings.direction, Direction::Vertical, "Vertical")
                .on_hover_text("Newest commits at the top, history flows down.")
                .changed();
            changed |= ui
                .selectable_value(
                    &mut self.settings.direction,
                    Direction::Horizontal,
                    "Horizontal",
                )
                .on_hover_text("Newest commits on the left, history flows right.")
                .changed();
        });
        changed |= ui
            .checkbox(&mut self.settings.compact, "Compact nodes")
            .on_hover_text("Small dots instead of commit cards.")
            .changed();
        changed |= ui
            .checkbox(&mut self.settings.color_by_author, "Color by author")
            .on_hover_text("One stable color per author email instead of per branch.")
            .changed();
        changed |= ui
            .checkbox(&mut self.settings.hide_merge_commits, "Hide merge commits")
            .on_hover_text("Drop commits with several parents and bridge across them.")
            .changed();

        ui.horizontal(|ui| {
            ui.label("Layered layout up to");
            changed |= ui
                .add(
                    egui::DragValue::new(&mut self.settings.layered_threshold)
                        .range(0..=200_000)
                        .speed(50.0)
                        .suffix(" commits"),
                )
                .on_hover_text("Larger histories use the linear layout.")
                .changed();
        });

        if changed {
            log::debug!("settings changed: {:?}", self.settings);
            self.mark_snapshot_dirty();
        }

        ui.separator();
        ui.label(RichText::new("View").strong());
        ui.add(
            egui::Slider::new(&mut self.cull_buffer, MIN_BUFFER_FACTOR..=4.0)
                .text("Cull buffer (viewports)"),
        )
        .on_hover_text("Extra area around the screen kept when culling.");
        ui.checkbox(&mut self.show_minimap, "Minimap");
        ui.checkbox(&mut self.show_fps_bar, "FPS display");
        ui.add_enabled_ui(self.show_fps_bar, |ui| {
            ui.horizontal_wrapped(|ui| {
                ui.checkbox(&mut self.fps_show_current, "current");
                ui.checkbox(&mut self.fps_show_average, "average");
                ui.checkbox(&mut self.fps_show_low, "low");
                ui.checkbox(&mut self.fps_show_frame_time, "frame time");
            });
        });

        ui.separator();
        self.draw_snapshot_stats(ui);
    }

    fn draw_snapshot_stats(&self, ui: &mut Ui) {
        ui.label(RichText::new("Snapshot").strong());

        let layout = &self.snapshot.layout;
        ui.label(format!("Algorithm: {}", layout.algorithm.label()));
        if let LayoutAlgorithm::Fallback(_) = layout.algorithm {
            ui.small("Lanes are not computed for this history.");
        }
        ui.label(format!(
            "Graph: {} commits, {} edges",
            layout.nodes.len(),
            layout.edges.len()
        ));
        if let Some(elapsed) = self.last_recompute {
            ui.label(format!("Last recompute: {:.1} ms", elapsed.as_secs_f64() * 1000.0));
        }

        let anomalies = self.snapshot.model.anomalies();
        if self.snapshot.cycle.has_cycle {
            ui.colored_label(
                egui::Color32::from_rgb(240, 170, 90),
                "History contains a parent cycle.",
            );
        }
        if self.snapshot.cycle.self_loops > 0 {
            ui.small(format!(
                "{} self-referencing commits ignored",
                self.snapshot.cycle.self_loops
            ));
        }
        if anomalies.dangling_parents > 0 {
            ui.small(format!(
                "{} parents outside the loaded range",
                anomalies.dangling_parents
            ));
        }
        if anomalies.duplicate_commits > 0 || self.stream.duplicates() > 0 {
            ui.small(format!(
                "{} duplicate commit records skipped",
                anomalies.duplicate_commits + self.stream.duplicates()
            ));
        }
    }
}
