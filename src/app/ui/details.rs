use eframe::egui::{self, Color32, RichText, Ui, vec2};

use commit_canvas::graph::ColorMode;
use commit_canvas::util::{format_age, short_hash};

use super::super::ViewModel;

fn committed_label(age: &str) -> String {
    format!("Committed: {age}")
}

impl ViewModel {
    const LEGEND_ROWS: usize = 40;

    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        egui::ScrollArea::vertical()
            .id_salt("details_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                self.draw_selected_commit(ui);
                ui.separator();
                self.draw_legend(ui);
            });
    }

    fn draw_selected_commit(&mut self, ui: &mut Ui) {
        let Some(selected_id) = self.selected.clone() else {
            ui.label("Click a commit on the canvas to inspect it.");
            return;
        };
        let Some(index) = self.snapshot.adjacency.index_of(&selected_id) else {
            ui.label("Selected commit is not part of the current graph.");
            return;
        };

        let record = self.snapshot.record(&self.filtered_commits, index);
        let color = self.snapshot.colors.commit_color(index);

        ui.horizontal(|ui| {
            let (swatch, _) = ui.allocate_exact_size(vec2(12.0, 12.0), egui::Sense::hover());
            ui.painter().circle_filled(swatch.center(), 5.0, color);
            ui.label(RichText::new(short_hash(&record.hash)).monospace().strong());
        });
        ui.small(record.hash.as_str());
        ui.add_space(6.0);

        if !record.subject.is_empty() {
            ui.label(RichText::new(record.subject.as_str()).strong());
        }
        ui.label(format!("Author: {} <{}>", record.author.name, record.author.email));
        if record.timestamp > 0 {
            ui.label(committed_label(&format_age(record.timestamp)));
        }

        if !record.refs.is_empty() {
            ui.horizontal_wrapped(|ui| {
                for commit_ref in &record.refs {
                    let mut text = RichText::new(commit_ref.name.as_str()).monospace();
                    if commit_ref.is_head {
                        text = text.strong();
                    }
                    ui.label(text)
                        .on_hover_text(commit_ref.kind.label());
                }
            });
        }

        let mut next_selection = None;
        ui.separator();
        ui.label(RichText::new("Parents").strong());
        let parents = self.snapshot.adjacency.parents_of(index);
        if parents.is_empty() {
            ui.small("Root commit or parents outside the loaded range.");
        }
        for &parent in parents {
            if self.commit_link(ui, parent).clicked() {
                next_selection = Some(parent);
            }
        }

        ui.label(RichText::new("Children").strong());
        let children = self.snapshot.adjacency.children_of(index);
        if children.is_empty() {
            ui.small("No loaded commit builds on this one.");
        }
        for &child in children {
            if self.commit_link(ui, child).clicked() {
                next_selection = Some(child);
            }
        }

        if let Some(next) = next_selection {
            let id = self.snapshot.adjacency.id(next).to_owned();
            if let Some(node) = self.snapshot.layout.nodes.get(next) {
                self.center_on(node.position.to_vec2());
            }
            self.set_selected(Some(id));
        }
    }

    fn commit_link(&self, ui: &mut Ui, index: usize) -> egui::Response {
        let record = self.snapshot.record(&self.filtered_commits, index);
        let label = format!("{}  {}", short_hash(&record.hash), record.subject);
        ui.link(label).on_hover_text(record.hash.as_str())
    }

    fn draw_legend(&self, ui: &mut Ui) {
        ui.label(RichText::new("Legend").strong());

        if self.settings.engine_config().color_mode == ColorMode::Author {
            ui.small("Colored by author email.");
            return;
        }

        let mut rows = 0usize;
        for (name, color) in self.snapshot.colors.legend() {
            if rows == Self::LEGEND_ROWS {
                ui.small("...");
                break;
            }
            ui.horizontal(|ui| {
                let (swatch, _) = ui.allocate_exact_size(vec2(14.0, 10.0), egui::Sense::hover());
                ui.painter().rect_filled(swatch, 2.0, color);
                ui.label(RichText::new(name).monospace());
            });
            rows += 1;
        }

        if rows == 0 {
            ui.small("No branches or tags in the loaded history.");
        }
        ui.horizontal(|ui| {
            let (swatch, _) = ui.allocate_exact_size(vec2(14.0, 10.0), egui::Sense::hover());
            ui.painter()
                .rect_filled(swatch, 2.0, commit_canvas::graph::color::NEUTRAL_COLOR);
            ui.label(RichText::new("no branch").color(Color32::from_gray(170)));
        });
    }
}

#[cfg(test)]
mod tests {
    use commit_canvas::util::format_age_at;

    use super::*;

    #[test]
    fn committed_label_uses_age_suffix_once() {
        let label = committed_label(&format_age_at(1_000, 1_000 + 3 * 3600));
        assert_eq!(label, "Committed: 3h ago");
        assert_eq!(committed_label(&format_age_at(50, 40)), "Committed: in the future");
    }
}
