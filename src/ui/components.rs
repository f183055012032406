//! Reusable UI components
//!
//! This module contains standalone UI components that can be used
//! throughout the application.

use crate::theme;
use eframe::egui;

/// Render a scalar cell value without JSON quoting
pub fn format_cell(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Painted button with a leading Phosphor icon, sized to its label
pub fn pill_button(
    ui: &mut egui::Ui,
    icon: &str,
    label: &str,
    base: egui::Color32,
) -> egui::Response {
    let text = format!("{}  {}", icon, label);
    let galley = ui.painter().layout_no_wrap(
        text,
        egui::FontId::proportional(12.0),
        egui::Color32::WHITE,
    );
    let size = egui::vec2(galley.size().x + 24.0, 26.0);
    let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click());
    if response.hovered() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
    }
    let (fill, draw_rect) = theme::button_visual(&response, base, rect);
    ui.painter()
        .rect_filled(draw_rect, theme::RADIUS_DEFAULT, fill);
    ui.painter().galley(
        draw_rect.center() - galley.size() / 2.0,
        galley,
        egui::Color32::WHITE,
    );
    response
}

/// Square icon-only button (settings gear, open folder)
pub fn icon_button(ui: &mut egui::Ui, icon: &str) -> egui::Response {
    let (rect, response) =
        ui.allocate_exact_size(egui::vec2(28.0, 28.0), egui::Sense::click());
    if response.hovered() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        ui.painter()
            .rect_filled(rect, theme::RADIUS_DEFAULT, theme::BG_SURFACE);
    }
    ui.painter().text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        icon,
        egui::FontId::proportional(16.0),
        theme::TEXT_SECONDARY,
    );
    response
}

#[cfg(test)]
mod tests {
    use super::format_cell;
    use serde_json::json;

    #[test]
    fn cells_render_scalars_without_json_quoting() {
        assert_eq!(format_cell(&json!("Break")), "Break");
        assert_eq!(format_cell(&json!(42)), "42");
        assert_eq!(format_cell(&json!(-13.5)), "-13.5");
        assert_eq!(format_cell(&json!(true)), "true");
        assert_eq!(format_cell(&json!(null)), "");
    }
}
