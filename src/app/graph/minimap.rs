use eframe::egui::{Color32, Id, Pos2, Rect, Sense, Stroke, StrokeKind, Ui, pos2, vec2};

use super::super::ViewModel;

const MINIMAP_MAX_SIZE: f32 = 180.0;
const MINIMAP_MARGIN: f32 = 12.0;
const MINIMAP_MAX_DOTS: usize = 6_000;

/// Maps the full layout bounds onto a small screen rect, keeping aspect ratio.
struct MinimapTransform {
    world: Rect,
    screen: Rect,
    scale: f32,
}

impl MinimapTransform {
    fn new(world: Rect, canvas: Rect) -> Option<Self> {
        if !world.is_positive() {
            return None;
        }

        let scale = (MINIMAP_MAX_SIZE / world.width()).min(MINIMAP_MAX_SIZE / world.height());
        let size = world.size() * scale;
        let size = vec2(size.x.max(24.0), size.y.max(24.0));
        let screen = Rect::from_min_size(
            canvas.right_bottom() - size - vec2(MINIMAP_MARGIN, MINIMAP_MARGIN),
            size,
        );
        Some(Self {
            world,
            screen,
            scale,
        })
    }

    fn to_screen(&self, world: Pos2) -> Pos2 {
        self.screen.min + (world - self.world.min) * self.scale
    }

    fn to_world(&self, screen: Pos2) -> Pos2 {
        self.world.min + (screen - self.screen.min) / self.scale
    }
}

impl ViewModel {
    /// Overview of the whole layout with the current viewport outlined.
    /// Clicking or dragging inside it recenters the canvas.
    pub(in crate::app) fn draw_minimap(&mut self, ui: &Ui, canvas: Rect) {
        let layout = &self.snapshot.layout;
        let Some(transform) = MinimapTransform::new(layout.bounds, canvas) else {
            return;
        };
        if canvas.width() < transform.screen.width() * 2.0
            || canvas.height() < transform.screen.height() * 2.0
        {
            return;
        }

        let painter = ui.painter_at(canvas);
        let frame = transform.screen.expand(4.0);
        painter.rect_filled(frame, 4.0, Color32::from_rgba_unmultiplied(10, 12, 16, 215));
        painter.rect_stroke(
            frame,
            4.0,
            Stroke::new(1.0, Color32::from_gray(70)),
            StrokeKind::Inside,
        );

        let stride = layout.nodes.len().div_ceil(MINIMAP_MAX_DOTS).max(1);
        for node in layout.nodes.iter().step_by(stride) {
            painter.circle_filled(transform.to_screen(node.position), 1.2, node.color);
        }

        let visible = self.viewport(canvas).visible_world_rect();
        let outline = Rect::from_two_pos(
            transform.to_screen(visible.min),
            transform.to_screen(visible.max),
        )
        .intersect(frame);
        if outline.is_positive() {
            painter.rect_stroke(
                outline,
                2.0,
                Stroke::new(1.4, Color32::from_rgb(245, 206, 93)),
                StrokeKind::Outside,
            );
        }

        let response = ui.interact(frame, Id::new("commit-minimap"), Sense::click_and_drag());
        if (response.clicked() || response.dragged())
            && let Some(pointer) = response.interact_pointer_pos()
        {
            let clamped = pos2(
                pointer.x.clamp(transform.screen.left(), transform.screen.right()),
                pointer.y.clamp(transform.screen.top(), transform.screen.bottom()),
            );
            self.center_on(transform.to_world(clamped).to_vec2());
        }
    }
}
