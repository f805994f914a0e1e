//! One message row per [`RowModel`] variant.

use eframe::egui;

use super::format::render_body;
use super::{RowAction, RowContext};
use crate::list::{RowCommon, RowModel};
use crate::ui::theme;

const AVATAR_SIZE: f32 = 34.0;
const GUTTER: f32 = 12.0;
/// Reactions offered in the row context menu
pub(crate) const QUICK_REACTIONS: [&str; 5] = ["👍", "❤️", "😂", "🎉", "👀"];

/// Render one row and return the action the user triggered on it, if any.
pub(super) fn render_row(ui: &mut egui::Ui, model: &RowModel, ctx: &RowContext<'_>) -> Option<RowAction> {
    let common = model.common();
    let mut action = None;

    // Runs are separated by a little more space than rows inside a run
    ui.add_space(if common.flags.show_avatar { 10.0 } else { 2.0 });

    // Background slot reserved before the content so the fill paints behind it
    let background = ui.painter().add(egui::Shape::Noop);

    let inner = match model {
        RowModel::System { text, .. } => render_system(ui, common, text, ctx),
        RowModel::Text { body, .. } => render_with_gutter(ui, common, ctx, &mut action, |ui| {
            let color = if common.failed {
                ctx.theme.text_muted
            } else {
                ctx.theme.text_primary
            };
            render_body(ui, body, color, ctx.theme);
        }),
        RowModel::Attachment { caption, files, .. } => {
            render_with_gutter(ui, common, ctx, &mut action, |ui| {
                if !caption.is_empty() {
                    render_body(ui, caption, ctx.theme.text_primary, ctx.theme);
                }
                for (name, size) in files {
                    egui::Frame::new()
                        .fill(ctx.theme.surface[3])
                        .corner_radius(6.0)
                        .inner_margin(egui::Margin::symmetric(10, 6))
                        .show(ui, |ui| {
                            ui.horizontal(|ui| {
                                ui.label(egui::RichText::new("📎").size(14.0));
                                ui.label(
                                    egui::RichText::new(name)
                                        .size(13.0)
                                        .strong()
                                        .color(ctx.theme.text_primary),
                                );
                                ui.label(
                                    egui::RichText::new(size)
                                        .size(11.0)
                                        .color(ctx.theme.text_muted),
                                );
                            });
                        });
                }
            })
        }
    };

    let fill = match model {
        RowModel::Text { mentions_me: true, .. } => Some(ctx.theme.mention_bg),
        _ if common.is_own => Some(ctx.theme.own_bg),
        _ if inner.hovered() => Some(ctx.theme.surface[3]),
        _ => None,
    };
    if let Some(fill) = fill {
        let rect = inner.rect.expand2(egui::vec2(0.0, 2.0));
        ui.painter()
            .set(background, egui::epaint::RectShape::filled(rect, 6.0, fill));
    }

    inner.context_menu(|ui| {
        if !matches!(model, RowModel::System { .. }) {
            ui.horizontal(|ui| {
                for emoji in QUICK_REACTIONS {
                    if ui.button(emoji).clicked() {
                        action = Some(RowAction::React {
                            message_id: common.id.clone(),
                            emoji: emoji.to_string(),
                        });
                        ui.close_menu();
                    }
                }
            });
            ui.separator();
            if ui.button("↩ Reply").clicked() {
                action = Some(RowAction::Reply {
                    message_id: common.id.clone(),
                });
                ui.close_menu();
            }
        }
        if common.is_own && !common.pending && !common.failed {
            if matches!(model, RowModel::Text { .. }) && ui.button("✏ Edit").clicked() {
                action = Some(RowAction::Edit {
                    message_id: common.id.clone(),
                });
                ui.close_menu();
            }
            if ui.button("🗑 Delete").clicked() {
                action = Some(RowAction::Delete {
                    message_id: common.id.clone(),
                });
                ui.close_menu();
            }
        }
        if ui.button("📋 Copy text").clicked() {
            let text = match model {
                RowModel::Text { body, .. } => body.clone(),
                RowModel::System { text, .. } => text.clone(),
                RowModel::Attachment { caption, .. } => caption.clone(),
            };
            ui.ctx().copy_text(text);
            ui.close_menu();
        }
    });

    ui.add_space(2.0);
    action
}

fn render_system(
    ui: &mut egui::Ui,
    common: &RowCommon,
    text: &str,
    ctx: &RowContext<'_>,
) -> egui::Response {
    ui.horizontal(|ui| {
        ui.add_space(AVATAR_SIZE + GUTTER * 2.0);
        ui.label(egui::RichText::new("•").size(12.0).color(ctx.theme.text_muted));
        ui.label(
            egui::RichText::new(text)
                .size(12.0)
                .italics()
                .color(ctx.theme.text_muted),
        );
        ui.label(
            egui::RichText::new(&common.time)
                .size(10.0)
                .color(ctx.theme.text_muted),
        );
    })
    .response
    .interact(egui::Sense::click())
}

/// Avatar column plus content column shared by text and attachment rows.
fn render_with_gutter(
    ui: &mut egui::Ui,
    common: &RowCommon,
    ctx: &RowContext<'_>,
    action: &mut Option<RowAction>,
    content: impl FnOnce(&mut egui::Ui),
) -> egui::Response {
    ui.horizontal_top(|ui| {
        ui.add_space(GUTTER);
        if common.flags.show_avatar {
            theme::render_avatar(ui, &common.author, AVATAR_SIZE);
        } else {
            ui.add_space(AVATAR_SIZE);
        }
        ui.add_space(GUTTER);

        ui.vertical(|ui| {
            ui.set_max_width(ui.available_width() - GUTTER);
            if common.flags.show_avatar {
                let name = if common.is_own { ctx.display_name } else { common.author.as_str() };
                ui.label(
                    egui::RichText::new(name)
                        .size(14.0)
                        .strong()
                        .color(theme::author_color(&common.author)),
                );
            }

            if let (Some((author, preview)), Some(target)) = (&common.reply_preview, &common.reply_to) {
                let quote = egui::Frame::new()
                    .fill(ctx.theme.surface[4])
                    .corner_radius(4.0)
                    .inner_margin(egui::Margin::symmetric(8, 2))
                    .show(ui, |ui| {
                        ui.label(
                            egui::RichText::new(format!("↪ {author}: {preview}"))
                                .size(12.0)
                                .color(ctx.theme.text_secondary),
                        );
                    })
                    .response
                    .interact(egui::Sense::click())
                    .on_hover_cursor(egui::CursorIcon::PointingHand);
                if quote.clicked() {
                    *action = Some(RowAction::ShowMessage {
                        message_id: target.clone(),
                    });
                }
            }

            content(ui);

            if !common.reactions.is_empty() {
                ui.horizontal_wrapped(|ui| {
                    for (emoji, count, mine) in &common.reactions {
                        let chip = egui::Button::new(
                            egui::RichText::new(format!("{emoji} {count}")).size(12.0),
                        )
                        .selected(*mine)
                        .corner_radius(10.0);
                        if ui.add(chip).clicked() {
                            *action = Some(RowAction::React {
                                message_id: common.id.clone(),
                                emoji: emoji.clone(),
                            });
                        }
                    }
                });
            }

            let status = status_line(common);
            if !status.is_empty() {
                let color = if common.failed {
                    ctx.theme.error
                } else {
                    ctx.theme.text_muted
                };
                ui.label(egui::RichText::new(status).size(11.0).color(color));
            }
        });
    })
    .response
    .interact(egui::Sense::click())
}

/// Trailing metadata: time at the end of a run, edit marker, delivery state.
fn status_line(common: &RowCommon) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if common.flags.show_timestamp {
        parts.push(&common.time);
    }
    if common.edited {
        parts.push("(edited)");
    }
    if common.pending {
        parts.push("sending…");
    } else if common.failed {
        parts.push("not sent");
    }
    parts.join(" · ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::RowFlags;

    fn common() -> RowCommon {
        RowCommon {
            id: "1".into(),
            author: "me".into(),
            flags: RowFlags {
                show_avatar: false,
                show_timestamp: true,
            },
            time: "12:30".into(),
            edited: false,
            pending: false,
            failed: false,
            is_own: true,
            reactions: Vec::new(),
            reply_to: None,
            reply_preview: None,
        }
    }

    #[test]
    fn test_status_line() {
        let mut c = common();
        assert_eq!(status_line(&c), "12:30");
        c.edited = true;
        c.pending = true;
        assert_eq!(status_line(&c), "12:30 · (edited) · sending…");
        c.flags.show_timestamp = false;
        c.edited = false;
        c.pending = false;
        c.failed = true;
        assert_eq!(status_line(&c), "not sent");
        c.failed = false;
        assert_eq!(status_line(&c), "");
    }
}
