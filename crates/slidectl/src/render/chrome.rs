//! Navigation chrome: progress bar, navigation dots, prev/next buttons,
//! footer and slide counter.

use eframe::egui::{self, FontId, Rect, Sense};

use crate::input::Command;
use crate::theme::Theme;
use crate::view::{DeckView, NavButton};

pub fn draw_progress(ui: &egui::Ui, view: &DeckView, theme: &Theme, rect: Rect, scale: f32) {
    let height = 6.0 * scale;
    let track = Rect::from_min_size(rect.left_top(), egui::vec2(rect.width(), height));
    ui.painter()
        .rect_filled(track, 0.0, Theme::with_opacity(theme.foreground, 0.08));

    let bar = Rect::from_min_size(
        rect.left_top(),
        egui::vec2(rect.width() * view.progress.clamp(0.0, 1.0), height),
    );
    ui.painter().rect_filled(bar, 0.0, theme.accent);
}

/// Draw dots and buttons; returns the command for a click, if any.
pub fn draw_navigation(
    ui: &egui::Ui,
    view: &DeckView,
    theme: &Theme,
    rect: Rect,
    scale: f32,
) -> Option<Command> {
    let mut command = None;

    let spacing = 28.0 * scale;
    let radius = 7.0 * scale;
    let count = view.dots.len();
    let row_width = spacing * count.saturating_sub(1) as f32;
    let y = rect.bottom() - 48.0 * scale;
    let start_x = rect.center().x - row_width / 2.0;

    for (i, active) in view.dots.iter().copied().enumerate() {
        let center = egui::pos2(start_x + i as f32 * spacing, y);
        let hit = Rect::from_center_size(center, egui::vec2(spacing, spacing));
        let response = ui.interact(hit, ui.id().with(("nav-dot", i)), Sense::click());

        let (r, color) = if active {
            (radius * 1.3, theme.accent)
        } else if response.hovered() {
            (radius, Theme::with_opacity(theme.foreground, 0.7))
        } else {
            (radius, Theme::with_opacity(theme.foreground, 0.35))
        };
        ui.painter().circle_filled(center, r, color);

        if response.clicked() {
            command = Some(Command::GoTo(i));
        }
    }

    let button_y = rect.center().y;
    let margin = 48.0 * scale;
    let prev_center = egui::pos2(rect.left() + margin, button_y);
    let next_center = egui::pos2(rect.right() - margin, button_y);
    if nav_button(ui, "nav-prev", "\u{2039}", view.prev, prev_center, theme, scale) {
        command = Some(Command::Prev);
    }
    if nav_button(ui, "nav-next", "\u{203A}", view.next, next_center, theme, scale) {
        command = Some(Command::Next);
    }

    command
}

fn nav_button(
    ui: &egui::Ui,
    id: &str,
    label: &str,
    button: NavButton,
    center: egui::Pos2,
    theme: &Theme,
    scale: f32,
) -> bool {
    let radius = 28.0 * scale;
    let rect = Rect::from_center_size(center, egui::vec2(radius * 2.0, radius * 2.0));
    let response = ui.interact(rect, ui.id().with(id), Sense::click());

    let opacity = button.opacity();
    let fill = if response.hovered() && button.enabled {
        Theme::with_opacity(theme.accent, 0.9 * opacity)
    } else {
        Theme::with_opacity(theme.code_background, 0.8 * opacity)
    };
    ui.painter().circle_filled(center, radius, fill);

    let color = Theme::with_opacity(theme.heading_color, opacity);
    let galley = ui
        .painter()
        .layout_no_wrap(label.to_string(), FontId::proportional(40.0 * scale), color);
    let pos = center - galley.rect.size() / 2.0;
    ui.painter().galley(pos, galley, color);

    response.clicked()
}

pub fn draw_footer(
    ui: &egui::Ui,
    footer: Option<&str>,
    current: usize,
    count: usize,
    theme: &Theme,
    rect: Rect,
    scale: f32,
) {
    if let Some(footer) = footer {
        let footer_color = Theme::with_opacity(theme.foreground, 0.4);
        let galley = ui.painter().layout_no_wrap(
            footer.to_string(),
            FontId::proportional(14.0 * scale),
            footer_color,
        );
        let pos = egui::pos2(
            rect.left() + 16.0 * scale,
            rect.bottom() - 30.0 * scale,
        );
        ui.painter().galley(pos, galley, footer_color);
    }

    let counter_text = format!("{} / {}", current + 1, count);
    let counter_color = Theme::with_opacity(theme.foreground, 0.3);
    let counter_galley = ui.painter().layout_no_wrap(
        counter_text,
        FontId::monospace(14.0 * scale),
        counter_color,
    );
    let counter_pos = egui::pos2(
        rect.right() - counter_galley.rect.width() - 16.0 * scale,
        rect.bottom() - 30.0 * scale,
    );
    ui.painter()
        .galley(counter_pos, counter_galley, counter_color);
}
