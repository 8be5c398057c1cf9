use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{
    self, Align2, Color32, CursorIcon, FontId, Pos2, Rect, Sense, Stroke, StrokeKind, Ui, Vec2,
    vec2,
};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use commit_canvas::graph::{CommitRecord, GraphNode};
use commit_canvas::util::short_hash;

use super::super::render_utils::{
    RELATED_COLOR, SEARCH_COLOR, SELECTED_COLOR, blend_color, dim_color, draw_background,
    draw_route, readable_text_color,
};
use super::super::{SearchMatchCache, ViewModel};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

fn commit_matches(matcher: &SkimMatcherV2, commit: &CommitRecord, query: &str) -> bool {
    if commit.hash.starts_with(query) {
        return true;
    }
    fuzzy_match_score(matcher, &commit.subject, query).is_some()
        || fuzzy_match_score(matcher, &commit.author.name, query).is_some()
        || commit
            .refs
            .iter()
            .any(|commit_ref| fuzzy_match_score(matcher, &commit_ref.name, query).is_some())
}

fn truncate_to_width(text: &str, width: f32, char_width: f32) -> String {
    let max_chars = (width / char_width).floor().max(0.0) as usize;
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    let mut truncated = text
        .chars()
        .take(max_chars.saturating_sub(1))
        .collect::<String>();
    truncated.push('…');
    truncated
}

/// Per-node paint state for one frame.
struct NodeStyle {
    fill: Color32,
    outline: Stroke,
    emphasized: bool,
}

impl ViewModel {
    pub(in crate::app) fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.snapshot_revision == self.snapshot_revision
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = (0..self.snapshot.model.len())
            .filter(|&index| {
                commit_matches(
                    &matcher,
                    self.snapshot.record(&self.filtered_commits, index),
                    query,
                )
            })
            .collect::<HashSet<_>>();
        log::debug!("search {query:?} matched {} commits", matches.len());
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            snapshot_revision: self.snapshot_revision,
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) =
            ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        if self.fit_pending && !self.snapshot.layout.is_empty() {
            self.fit_view(rect);
        }

        let painter = ui.painter_at(rect);
        draw_background(&painter, rect, self.pan, self.zoom);

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);
        if ui.memory(|memory| memory.focused().is_none()) {
            self.handle_keyboard_navigation(ui, rect);
        }

        if self.snapshot.layout.is_empty() {
            self.visible_node_count = 0;
            self.visible_edge_count = 0;
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No commits to show with the current settings.",
                FontId::proportional(14.0),
                Color32::from_gray(200),
            );
            return;
        }

        let search_matches = self.cached_search_matches();
        let viewport = self.viewport(rect);
        let culled = self.snapshot.cull(&viewport, self.cull_buffer);
        let hovered = self.hovered_index(ui, rect);
        let selected_index = self
            .selected
            .as_deref()
            .and_then(|id| self.snapshot.adjacency.index_of(id));
        let related = selected_index
            .map(|index| self.snapshot.adjacency.highlight_index(index))
            .unwrap_or_default();

        if hovered.is_some() {
            ui.ctx().set_cursor_icon(CursorIcon::PointingHand);
        }

        let pending_selection = if response.clicked_by(egui::PointerButton::Primary) {
            Some(hovered.map(|index| self.snapshot.model.id(index).to_owned()))
        } else {
            None
        };

        let layout = &self.snapshot.layout;
        let zoom = viewport.effective_zoom();
        let selection_active = selected_index.is_some();
        let search_active = search_matches
            .as_ref()
            .is_some_and(|matches| !matches.is_empty());
        let visible_rect = rect.expand(layout.node_size.max_elem() * zoom);

        let mut route = Vec::new();
        let mut drawn_edges = 0usize;
        for &edge_index in &culled.edges {
            let edge = &layout.edges[edge_index];
            let touches_selection =
                selected_index == Some(edge.source) || selected_index == Some(edge.target);

            let base_width = if edge.is_merge { 1.2 } else { 1.8 };
            let (width, color) = if touches_selection {
                ((base_width + 1.0) * zoom.sqrt(), blend_color(edge.color, RELATED_COLOR, 0.35))
            } else if selection_active || search_active {
                (base_width * zoom.sqrt(), dim_color(edge.color, 0.35))
            } else {
                (base_width * zoom.sqrt(), edge.color)
            };

            route.clear();
            route.extend(edge.route.iter().map(|point| viewport.world_to_screen(*point)));
            draw_route(
                &painter,
                rect.min,
                &route,
                Stroke::new(width.clamp(0.5, 4.5), color),
            );
            drawn_edges += 1;
        }

        let mut drawn_nodes = 0usize;
        for &index in &culled.nodes {
            let node = &layout.nodes[index];
            let center = rect.min + viewport.world_to_screen(node.position).to_vec2();
            if !visible_rect.contains(center) {
                continue;
            }

            let is_selected = selected_index == Some(index);
            let is_related = related.contains(&index);
            let is_match = search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&index));
            let style = Self::node_style(
                node.color,
                is_selected,
                is_related,
                hovered == Some(index),
                is_match,
                selection_active,
                search_active,
            );

            let record = self.snapshot.record(&self.filtered_commits, index);
            if node.compact {
                Self::paint_compact_node(&painter, node, record, center, zoom, &style);
            } else {
                Self::paint_card_node(&painter, layout.node_size, record, center, zoom, &style);
            }
            drawn_nodes += 1;
        }

        self.visible_node_count = drawn_nodes;
        self.visible_edge_count = drawn_edges;

        if let Some(index) = hovered {
            let record = self.snapshot.record(&self.filtered_commits, index);
            let text = format!(
                "{}  |  {}  |  {}",
                short_hash(&record.hash),
                record.author.name,
                record.subject
            );
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                text,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        if self.show_minimap {
            self.draw_minimap(ui, rect);
        }

        if let Some(selected) = pending_selection {
            self.set_selected(selected);
        }
    }

    fn node_style(
        base: Color32,
        is_selected: bool,
        is_related: bool,
        is_hovered: bool,
        is_match: bool,
        selection_active: bool,
        search_active: bool,
    ) -> NodeStyle {
        let fill = if is_selected {
            blend_color(base, SELECTED_COLOR, 0.55)
        } else if is_hovered {
            blend_color(base, Color32::WHITE, 0.3)
        } else if is_related {
            blend_color(base, RELATED_COLOR, 0.4)
        } else if is_match {
            blend_color(base, SEARCH_COLOR, 0.5)
        } else if selection_active || search_active {
            dim_color(base, 0.45)
        } else {
            base
        };

        let outline = if is_selected {
            Stroke::new(2.4, SELECTED_COLOR)
        } else if is_related {
            Stroke::new(1.8, RELATED_COLOR)
        } else if is_match {
            Stroke::new(1.6, SEARCH_COLOR)
        } else {
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 190))
        };

        NodeStyle {
            fill,
            outline,
            emphasized: is_selected || is_related || is_hovered || is_match,
        }
    }

    fn paint_compact_node(
        painter: &egui::Painter,
        node: &GraphNode,
        record: &CommitRecord,
        center: Pos2,
        zoom: f32,
        style: &NodeStyle,
    ) {
        let radius = (7.0 * zoom).clamp(2.0, 16.0);
        painter.circle_filled(center, radius, style.fill);
        painter.circle_stroke(center, radius, style.outline);
        if record.is_head() {
            painter.circle_stroke(center, radius + 3.0, Stroke::new(1.4, node.color));
        }

        if zoom < 0.7 && !style.emphasized {
            return;
        }

        let mut label_pos = center + vec2(radius + 6.0, 0.0);
        for commit_ref in &record.refs {
            let galley = painter.layout_no_wrap(
                commit_ref.name.clone(),
                FontId::monospace(11.0),
                readable_text_color(node.color),
            );
            let badge = Rect::from_min_size(
                label_pos - vec2(0.0, galley.size().y * 0.5 + 2.0),
                galley.size() + vec2(8.0, 4.0),
            );
            painter.rect_filled(badge, 4.0, node.color);
            painter.galley(badge.min + vec2(4.0, 2.0), galley, Color32::WHITE);
            label_pos.x = badge.right() + 4.0;
        }

        painter.text(
            label_pos,
            Align2::LEFT_CENTER,
            &record.subject,
            FontId::proportional(12.0),
            Color32::from_gray(if style.emphasized { 245 } else { 200 }),
        );
    }

    fn paint_card_node(
        painter: &egui::Painter,
        node_size: Vec2,
        record: &CommitRecord,
        center: Pos2,
        zoom: f32,
        style: &NodeStyle,
    ) {
        let card = Rect::from_center_size(center, node_size * zoom);
        let corner = (6.0 * zoom).clamp(1.0, 8.0);
        painter.rect_filled(card, corner, Color32::from_rgb(32, 38, 46));
        let stripe = Rect::from_min_size(card.min, vec2((5.0 * zoom).max(2.0), card.height()));
        painter.rect_filled(stripe, corner, style.fill);
        painter.rect_stroke(card, corner, style.outline, StrokeKind::Inside);

        if zoom < 0.45 {
            return;
        }

        let text_left = stripe.right() + 6.0 * zoom;
        let text_width = card.right() - text_left - 4.0;
        let font_size = (12.0 * zoom).clamp(8.0, 16.0);
        let hash_pos = Pos2::new(text_left, card.top() + card.height() * 0.3);
        let subject_pos = Pos2::new(text_left, card.top() + card.height() * 0.7);

        let mut header = short_hash(&record.hash).to_owned();
        for commit_ref in &record.refs {
            header.push_str("  ");
            header.push_str(&commit_ref.name);
        }
        painter.text(
            hash_pos,
            Align2::LEFT_CENTER,
            truncate_to_width(&header, text_width, font_size * 0.6),
            FontId::monospace(font_size),
            Color32::from_gray(230),
        );
        painter.text(
            subject_pos,
            Align2::LEFT_CENTER,
            truncate_to_width(&record.subject, text_width, font_size * 0.55),
            FontId::proportional(font_size),
            Color32::from_gray(190),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_keeps_short_text() {
        assert_eq!(truncate_to_width("abc", 100.0, 7.0), "abc");
        assert_eq!(truncate_to_width("abcdefgh", 28.0, 7.0), "abc…");
    }

    #[test]
    fn hash_prefix_and_subject_both_match() {
        let matcher = SkimMatcherV2::default();
        let mut commit = CommitRecord::new("deadbeef42", &[]);
        commit.subject = "Fix viewport culling".to_owned();

        assert!(commit_matches(&matcher, &commit, "deadb"));
        assert!(commit_matches(&matcher, &commit, "cull"));
        assert!(!commit_matches(&matcher, &commit, "zzzz"));
    }
}
