//! Conversation list panel with search and unread badges.

use eframe::egui::{self, Stroke};

use crate::state::ClientState;
use crate::ui::theme::{self, ChatTheme};

/// Render the left conversation list. Returns the conversation the user
/// clicked, if it is not already active.
pub fn render_sidebar(
    ctx: &egui::Context,
    state: &ClientState,
    filter: &mut String,
    theme: &ChatTheme,
) -> Option<String> {
    let mut clicked = None;

    egui::SidePanel::left("conversations_panel")
        .resizable(true)
        .default_width(230.0)
        .min_width(180.0)
        .frame(
            egui::Frame::new()
                .fill(theme.surface[1])
                .inner_margin(egui::Margin::same(0))
                .stroke(Stroke::new(1.0, theme.border)),
        )
        .show(ctx, |ui| {
            ui.add_space(12.0);
            ui.horizontal(|ui| {
                ui.add_space(16.0);
                ui.label(
                    egui::RichText::new("CONVERSATIONS")
                        .size(11.0)
                        .strong()
                        .color(theme.text_muted),
                );
                let unread = state.total_unread();
                if unread > 0 {
                    theme::badge(ui, &unread.to_string(), theme.accent);
                }
            });
            ui.add_space(8.0);

            if state.conversation_order.len() > 3 {
                ui.horizontal(|ui| {
                    ui.add_space(16.0);
                    ui.add_sized(
                        egui::vec2(ui.available_width() - 16.0, 28.0),
                        egui::TextEdit::singleline(filter)
                            .hint_text("🔍 Search conversations...")
                            .desired_width(f32::INFINITY),
                    );
                });
                ui.add_space(8.0);
            }

            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    for id in visible_conversations(state, filter) {
                        let Some(buffer) = state.buffers.get(id) else {
                            continue;
                        };
                        let is_active = state.active.as_deref() == Some(id.as_str());
                        if render_item(ui, id, buffer, is_active, theme).clicked() && !is_active {
                            clicked = Some(id.clone());
                        }
                    }
                });
        });

    clicked
}

/// Conversation ids in sidebar order matching the case-insensitive filter.
fn visible_conversations<'a>(state: &'a ClientState, filter: &str) -> Vec<&'a String> {
    let needle = filter.trim().to_lowercase();
    state
        .conversation_order
        .iter()
        .filter(|id| {
            needle.is_empty()
                || state
                    .buffers
                    .get(*id)
                    .is_some_and(|b| b.title.to_lowercase().contains(&needle))
        })
        .collect()
}

fn render_item(
    ui: &mut egui::Ui,
    id: &str,
    buffer: &crate::buffer::ConversationBuffer,
    is_active: bool,
    theme: &ChatTheme,
) -> egui::Response {
    let (rect, response) = ui.allocate_exact_size(
        egui::vec2(ui.available_width(), 34.0),
        egui::Sense::click(),
    );
    let painter = ui.painter();
    if is_active {
        painter.rect_filled(rect.shrink2(egui::vec2(8.0, 1.0)), 6.0, theme.surface[4]);
    } else if response.hovered() {
        painter.rect_filled(rect.shrink2(egui::vec2(8.0, 1.0)), 6.0, theme.surface[3]);
    }

    let mut child = ui.new_child(
        egui::UiBuilder::new()
            .max_rect(rect.shrink2(egui::vec2(16.0, 0.0)))
            .layout(egui::Layout::left_to_right(egui::Align::Center))
            .id_salt(id),
    );
    let strong = is_active || buffer.unread_count > 0;
    let color = if strong {
        theme.text_primary
    } else {
        theme.text_secondary
    };
    let prefix = if buffer.participants.len() > 2 { "#" } else { "@" };
    let mut title = egui::RichText::new(format!("{prefix} {}", buffer.title))
        .size(14.0)
        .color(color);
    if strong {
        title = title.strong();
    }
    child.label(title);

    child.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
        if buffer.unread_count > 0 {
            let fill = if buffer.has_mention {
                theme.warning
            } else {
                theme.accent
            };
            let text = if buffer.unread_count > 99 {
                "99+".to_string()
            } else {
                buffer.unread_count.to_string()
            };
            theme::badge(ui, &text, fill);
        }
    });

    response
}
