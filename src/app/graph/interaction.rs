use eframe::egui::{self, Key, Pos2, Rect, Ui};

use commit_canvas::graph::Viewport;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn viewport(&self, rect: Rect) -> Viewport {
        Viewport::new(self.pan, self.zoom, rect.size())
    }

    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let local = (pointer - rect.min).to_pos2();
        let world_before = self.viewport(rect).screen_to_world(local);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
        self.pan = pointer - rect.center() - (world_before.to_vec2() * self.zoom);
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
            || response.dragged_by(egui::PointerButton::Primary)
        {
            self.pan += response.drag_delta();
        }
    }

    /// Commit under the pointer, using the same world transform as culling.
    pub(in crate::app) fn hovered_index(&self, ui: &Ui, rect: Rect) -> Option<usize> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        if !rect.contains(pointer) {
            return None;
        }

        let viewport = self.viewport(rect);
        let world = viewport.screen_to_world((pointer - rect.min).to_pos2());
        let node_size = self.snapshot.layout.node_size;
        let radius = (node_size.min_elem() * 0.5).max(6.0 / viewport.effective_zoom());
        self.snapshot.node_at(world, radius)
    }

    /// Arrow keys walk the first-parent chain and back up to the first child.
    pub(in crate::app) fn handle_keyboard_navigation(&mut self, ui: &Ui, rect: Rect) {
        let (to_parent, to_child, clear) = ui.input(|input| {
            (
                input.key_pressed(Key::ArrowDown) || input.key_pressed(Key::J),
                input.key_pressed(Key::ArrowUp) || input.key_pressed(Key::K),
                input.key_pressed(Key::Escape),
            )
        });

        if clear {
            self.set_selected(None);
            return;
        }

        let Some(selected) = self.selected.as_deref() else {
            return;
        };
        let Some(index) = self.snapshot.adjacency.index_of(selected) else {
            return;
        };

        let next = if to_parent {
            self.snapshot.adjacency.parents_of(index).first().copied()
        } else if to_child {
            self.snapshot.adjacency.children_of(index).first().copied()
        } else {
            None
        };

        if let Some(next) = next {
            let id = self.snapshot.adjacency.id(next).to_owned();
            self.reveal(next, rect);
            self.set_selected(Some(id));
        }
    }

    /// Scrolls so node `index` is on screen, leaving the view alone when it
    /// already is.
    pub(in crate::app) fn reveal(&mut self, index: usize, rect: Rect) {
        let Some(node) = self.snapshot.layout.nodes.get(index) else {
            return;
        };

        let viewport = self.viewport(rect);
        let screen = viewport.world_to_screen(node.position);
        let inner = Rect::from_min_size(Pos2::ZERO, rect.size()).shrink(40.0);
        if !inner.contains(screen) {
            self.center_on(node.position.to_vec2());
        }
    }
}
