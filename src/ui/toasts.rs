//! Status toast notifications - floating messages in top-right corner.

use eframe::egui;

use crate::ui::theme::ChatTheme;

/// Render floating status toasts, newest last.
pub fn render_status_toasts(
    ctx: &egui::Context,
    status_messages: &[(String, std::time::Instant)],
    theme: &ChatTheme,
) {
    if status_messages.is_empty() {
        return;
    }

    egui::Area::new(egui::Id::new("status_toast_area"))
        .anchor(egui::Align2::RIGHT_TOP, [-12.0, 40.0]) // Below menu bar
        .show(ctx, |ui| {
            egui::Frame::new()
                .fill(theme.surface[4].gamma_multiply(0.95))
                .stroke(egui::Stroke::new(1.0, theme.border))
                .corner_radius(6.0)
                .inner_margin(egui::Margin::symmetric(12, 8))
                .show(ui, |ui| {
                    for (msg, _) in status_messages {
                        ui.label(egui::RichText::new(msg).color(theme.text_primary));
                    }
                });
        });
}
