//! Message panel layout: banner, load indicator and the windowed scroll area.

use eframe::egui;

use super::row::render_row;
use super::{RowAction, RowContext};
use crate::buffer::ConversationBuffer;
use crate::list::{build_row, MessageList, ScrollAnchor};

/// Render the mounted list of the active conversation.
///
/// `generation` keys the scroll area so a remount never inherits the
/// previous conversation's scroll offset.
pub fn render_message_list(
    ui: &mut egui::Ui,
    list: &mut MessageList,
    buffer: &ConversationBuffer,
    banner: Option<&str>,
    generation: u64,
    ctx: &RowContext<'_>,
) -> Vec<RowAction> {
    let mut actions = Vec::new();

    if let Some(text) = banner {
        render_banner(ui, text, ctx, &mut actions);
    }
    if buffer.is_loading() {
        ui.horizontal(|ui| {
            ui.add_space(12.0);
            ui.spinner();
            ui.label(
                egui::RichText::new("Loading messages…")
                    .size(12.0)
                    .color(ctx.theme.text_muted),
            );
        });
    }

    list.sync_if_changed(buffer.revision(), &buffer.messages);

    if buffer.messages.is_empty() {
        if !buffer.is_loading() && banner.is_none() {
            ui.centered_and_justified(|ui| {
                ui.label(
                    egui::RichText::new("No messages yet. Say hello!")
                        .size(14.0)
                        .color(ctx.theme.text_muted),
                );
            });
        }
        return actions;
    }

    let mut area = egui::ScrollArea::vertical()
        .id_salt(("message_list", generation))
        .auto_shrink([false; 2]);
    if let Some(offset) = list.take_scroll_request() {
        area = area.vertical_scroll_offset(offset);
    }

    let output = area.show_viewport(ui, |ui, viewport| {
        list.update_viewport(viewport.min.y, viewport.height());
        let window = list.window();
        ui.set_min_height(window.total_height);

        let origin = ui.max_rect().min;
        let width = ui.max_rect().width();
        let mut resized = false;

        for visible in &window.rows {
            let Some(model) = build_row(&buffer.messages, visible.index, ctx.user_id, ctx.display_name)
            else {
                continue;
            };
            let rect = egui::Rect::from_min_size(
                origin + egui::vec2(0.0, visible.offset),
                egui::vec2(width, visible.height),
            );
            let inner = ui.scope_builder(
                egui::UiBuilder::new()
                    .max_rect(rect)
                    .id_salt(&model.common().id),
                |ui| render_row(ui, &model, ctx),
            );
            if let Some(action) = inner.inner {
                actions.push(action);
            }
            resized |= list.measure(&model.common().id, inner.response.rect.height());
        }

        if resized {
            // Offsets moved; lay the window out again with the new heights
            ui.ctx().request_repaint();
        }
    });

    if list.poll_load_more(buffer.has_more, buffer.is_loading()) {
        actions.push(RowAction::LoadOlder);
    }

    if list.anchor() == ScrollAnchor::ScrolledUp {
        let button_rect = egui::Rect::from_min_size(
            output.inner_rect.right_bottom() - egui::vec2(136.0, 40.0),
            egui::vec2(120.0, 28.0),
        );
        let jump = ui.put(
            button_rect,
            egui::Button::new(egui::RichText::new("↓ Latest").size(13.0))
                .fill(ctx.theme.surface[4])
                .corner_radius(14.0),
        );
        if jump.clicked() {
            list.scroll_to_bottom();
        }
    }

    if list.has_scroll_request() {
        ui.ctx().request_repaint();
    }
    actions
}

fn render_banner(ui: &mut egui::Ui, text: &str, ctx: &RowContext<'_>, actions: &mut Vec<RowAction>) {
    egui::Frame::new()
        .fill(ctx.theme.error.linear_multiply(0.18))
        .stroke(egui::Stroke::new(1.0, ctx.theme.error))
        .corner_radius(6.0)
        .inner_margin(egui::Margin::symmetric(12, 8))
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("⚠").color(ctx.theme.error));
                ui.label(
                    egui::RichText::new(text)
                        .size(13.0)
                        .color(ctx.theme.text_primary),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Retry").clicked() {
                        actions.push(RowAction::RetryHistory);
                    }
                });
            });
        });
    ui.add_space(4.0);
}
