use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

pub(super) const CANVAS_BACKGROUND: Color32 = Color32::from_rgb(19, 23, 29);
pub(super) const SELECTED_COLOR: Color32 = Color32::from_rgb(245, 206, 93);
pub(super) const RELATED_COLOR: Color32 = Color32::from_rgb(241, 146, 94);
pub(super) const SEARCH_COLOR: Color32 = Color32::from_rgb(103, 196, 255);

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let mix = |from: u8, to: u8| (from as f32 + (to as f32 - from as f32) * amount) as u8;

    Color32::from_rgba_unmultiplied(
        mix(base.r(), overlay.r()),
        mix(base.g(), overlay.g()),
        mix(base.b(), overlay.b()),
        mix(base.a(), overlay.a()),
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

/// Grid that scrolls with the canvas so panning reads as movement.
pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, CANVAS_BACKGROUND);

    let step = (64.0 * zoom.clamp(0.5, 2.0)).max(24.0);
    let origin = rect.center() + pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 55));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.vline(x, rect.y_range(), stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.hline(rect.x_range(), y, stroke);
        y += step;
    }
}

/// Draws a route given in canvas-local screen space.
pub(super) fn draw_route(painter: &Painter, origin: Pos2, points: &[Pos2], stroke: Stroke) {
    if points.len() < 2 {
        return;
    }

    if points.len() == 2 {
        painter.line_segment([origin + points[0].to_vec2(), origin + points[1].to_vec2()], stroke);
        return;
    }

    let absolute = points
        .iter()
        .map(|point| origin + point.to_vec2())
        .collect::<Vec<_>>();
    painter.line(absolute, stroke);
}

pub(super) fn readable_text_color(background: Color32) -> Color32 {
    let luma = 0.299 * background.r() as f32
        + 0.587 * background.g() as f32
        + 0.114 * background.b() as f32;
    if luma > 150.0 {
        Color32::from_gray(20)
    } else {
        Color32::from_gray(240)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_endpoints_match_inputs() {
        let base = Color32::from_rgb(10, 20, 30);
        let overlay = Color32::from_rgb(200, 100, 0);
        assert_eq!(blend_color(base, overlay, 0.0), base);
        assert_eq!(blend_color(base, overlay, 1.0), overlay);
    }

    #[test]
    fn text_contrasts_with_background() {
        assert_eq!(readable_text_color(Color32::WHITE), Color32::from_gray(20));
        assert_eq!(readable_text_color(Color32::BLACK), Color32::from_gray(240));
    }
}
