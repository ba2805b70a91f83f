pub mod chrome;

use std::time::Instant;

use eframe::egui::{self, FontId, Pos2, Rect};

use crate::controller::SlideController;
use crate::deck::{Item, Slide};
use crate::preload::ImageCache;
use crate::theme::Theme;
use crate::view::SlideView;

/// Horizontal travel of a slide while it enters or exits, at reference scale.
const TRANSITION_SHIFT: f32 = 120.0;

pub fn compute_scale(rect: Rect) -> f32 {
    let ref_w = 1920.0;
    let ref_h = 1080.0;
    (rect.width() / ref_w).min(rect.height() / ref_h)
}

pub fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Draw the active slide, plus the outgoing one while a transition runs.
pub fn draw_deck(
    ui: &egui::Ui,
    controller: &SlideController,
    theme: &Theme,
    images: &mut ImageCache,
    rect: Rect,
    now: Instant,
    scale: f32,
) {
    let view = controller.view();
    let slides = controller.slides();
    let transition = controller.transition_state(now);

    let (progress, sign) = match transition {
        Some(t) => {
            let forward = t.from.is_none_or(|from| from <= t.to);
            (ease_in_out(t.progress), if forward { 1.0 } else { -1.0 })
        }
        None => (1.0, 1.0),
    };
    let shift = TRANSITION_SHIFT * scale;

    for (slide, slide_view) in slides.iter().zip(&view.slides) {
        let marks = slide_view.marks;
        if marks.exiting && !marks.active {
            let rect = rect.translate(egui::vec2(-sign * shift * progress, 0.0));
            draw_slide(ui, slide, slide_view, theme, images, rect, 1.0 - progress, now, scale);
        } else if marks.active {
            let (opacity, offset) = if marks.entering {
                (progress, sign * shift * (1.0 - progress))
            } else {
                (1.0, 0.0)
            };
            let rect = rect.translate(egui::vec2(offset, 0.0));
            draw_slide(ui, slide, slide_view, theme, images, rect, opacity, now, scale);
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn draw_slide(
    ui: &egui::Ui,
    slide: &Slide,
    slide_view: &SlideView,
    theme: &Theme,
    images: &mut ImageCache,
    rect: Rect,
    opacity: f32,
    now: Instant,
    scale: f32,
) {
    if opacity <= 0.0 {
        return;
    }
    let padding = 80.0 * scale;
    let content = rect.shrink(padding);
    let width = content.width();

    // Short slides (title, section) are centered vertically
    let centered = slide.items.len() <= 2;
    let total_height: f32 = if centered {
        let images: &ImageCache = images;
        slide
            .items
            .iter()
            .map(|item| measure_item(ui, item, theme, images, width, scale))
            .sum()
    } else {
        0.0
    };
    let mut y = if centered {
        (content.center().y - total_height / 2.0).max(content.top())
    } else {
        content.top()
    };

    for (item, style) in slide.items.iter().zip(&slide_view.items) {
        let (item_opacity, offset) = style.appearance(now);
        let alpha = opacity * item_opacity;
        let pos = egui::pos2(content.left(), y + offset * scale);
        let height = draw_item(ui, item, theme, images, pos, width, alpha, centered, scale);
        y += height;
    }
}

fn item_spacing(scale: f32) -> f32 {
    24.0 * scale
}

fn measure_item(
    ui: &egui::Ui,
    item: &Item,
    theme: &Theme,
    images: &ImageCache,
    width: f32,
    scale: f32,
) -> f32 {
    let spacing = item_spacing(scale);
    match item {
        Item::Image { path, .. } => image_rect(images, path, Pos2::ZERO, width, scale)
            .map(|r| r.height() + spacing)
            .unwrap_or(0.0),
        _ => {
            let (text, font, _) = text_style(item, theme, scale);
            let galley = ui
                .painter()
                .layout(text, font, theme.foreground, text_width(item, width, scale));
            galley.rect.height() + spacing + card_padding(item, scale) * 2.0
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_item(
    ui: &egui::Ui,
    item: &Item,
    theme: &Theme,
    images: &mut ImageCache,
    pos: Pos2,
    width: f32,
    opacity: f32,
    centered: bool,
    scale: f32,
) -> f32 {
    let spacing = item_spacing(scale);
    let painter = ui.painter();

    if let Item::Image { path, .. } = item {
        let Some(rect) = image_rect(images, path, pos, width, scale) else {
            return 0.0;
        };
        if opacity > 0.0 {
            if let Some(texture) = images.texture(ui.ctx(), path) {
                let uv = Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                painter.image(
                    texture.id(),
                    rect,
                    uv,
                    Theme::with_opacity(egui::Color32::WHITE, opacity),
                );
            }
        }
        return rect.height() + spacing;
    }

    let (text, font, color) = text_style(item, theme, scale);
    let color = Theme::with_opacity(color, opacity);
    let pad = card_padding(item, scale);
    let galley = painter.layout(text, font, color, text_width(item, width, scale));
    let text_height = galley.rect.height();

    let x = if centered {
        pos.x + (width - galley.rect.width()) / 2.0
    } else {
        pos.x
    };

    if opacity > 0.0 {
        match item {
            Item::Bullet(_) => {
                let radius = 6.0 * scale;
                let center = egui::pos2(pos.x + radius, pos.y + text_height / 2.0);
                painter.circle_filled(center, radius, Theme::with_opacity(theme.accent, opacity));
            }
            Item::Stagger(_) | Item::Code(_) => {
                let card = Rect::from_min_size(
                    pos,
                    egui::vec2(width, text_height + pad * 2.0),
                );
                painter.rect_filled(
                    card,
                    12.0 * scale,
                    Theme::with_opacity(theme.code_background, opacity),
                );
                if item.is_stagger() {
                    let bar = Rect::from_min_size(pos, egui::vec2(6.0 * scale, card.height()));
                    painter.rect_filled(bar, 3.0 * scale, Theme::with_opacity(theme.accent, opacity));
                }
            }
            _ => {}
        }
        let text_x = match item {
            Item::Bullet(_) => pos.x + 32.0 * scale,
            Item::Stagger(_) | Item::Code(_) => pos.x + pad * 1.5,
            _ => x,
        };
        painter.galley(egui::pos2(text_x, pos.y + pad), galley, color);
    }

    text_height + pad * 2.0 + spacing
}

fn text_style(item: &Item, theme: &Theme, scale: f32) -> (String, FontId, egui::Color32) {
    match item {
        Item::Heading { level, text } => (
            text.clone(),
            FontId::proportional(theme.heading_size(*level) * scale),
            theme.heading_color,
        ),
        Item::Paragraph(text) | Item::Bullet(text) | Item::Stagger(text) => (
            text.clone(),
            FontId::proportional(theme.body_size * 0.8 * scale),
            theme.foreground,
        ),
        Item::Code(code) => (
            code.clone(),
            FontId::monospace(theme.code_size * scale),
            theme.code_foreground,
        ),
        Item::Image { alt, .. } => (
            alt.clone(),
            FontId::proportional(theme.body_size * 0.5 * scale),
            theme.foreground,
        ),
    }
}

fn card_padding(item: &Item, scale: f32) -> f32 {
    match item {
        Item::Stagger(_) | Item::Code(_) => 16.0 * scale,
        _ => 0.0,
    }
}

fn text_width(item: &Item, width: f32, scale: f32) -> f32 {
    match item {
        Item::Bullet(_) => width - 32.0 * scale,
        Item::Stagger(_) | Item::Code(_) => width - card_padding(item, scale) * 3.0,
        _ => width,
    }
}

/// Where an image lands: fit to the content width and 40% of the reference height.
fn image_rect(images: &ImageCache, path: &str, pos: Pos2, width: f32, scale: f32) -> Option<Rect> {
    let [w, h] = images.size(path)?;
    if w == 0 || h == 0 {
        return None;
    }
    let max_h = 1080.0 * 0.4 * scale;
    let fit = (width / w as f32).min(max_h / h as f32);
    let size = egui::vec2(w as f32 * fit, h as f32 * fit);
    let x = pos.x + (width - size.x) / 2.0;
    Some(Rect::from_min_size(egui::pos2(x, pos.y), size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_matches_reference() {
        let rect = Rect::from_min_size(Pos2::ZERO, egui::vec2(1920.0, 1080.0));
        assert_eq!(compute_scale(rect), 1.0);
        let narrow = Rect::from_min_size(Pos2::ZERO, egui::vec2(960.0, 1080.0));
        assert_eq!(compute_scale(narrow), 0.5);
    }

    #[test]
    fn test_ease_in_out_endpoints() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert_eq!(ease_in_out(1.0), 1.0);
        assert!((ease_in_out(0.5) - 0.5).abs() < 1e-6);
    }
}
