//! Message composer with reply / edit modes and input history

use eframe::egui;

use crate::app::ChatApp;
use crate::input_state::{ComposerMode, Submission};
use crate::protocol::BackendAction;

impl ChatApp {
    /// Render the composer at the bottom of the window.
    pub(in crate::app) fn render_input_panel(&mut self, ctx: &egui::Context) {
        let theme = self.theme.clone();
        let composer_id = egui::Id::new("composer_input");
        let mut submitted = None;

        egui::TopBottomPanel::bottom("input_panel")
            .frame(
                egui::Frame::new()
                    .fill(theme.surface[1])
                    .inner_margin(egui::Margin::symmetric(12, 10))
                    .stroke(egui::Stroke::new(1.0, theme.border)),
            )
            .show(ctx, |ui| {
                if self.render_mode_banner(ui) {
                    self.input.cancel();
                }

                // Keys the composer handles itself are consumed before the
                // text edit sees them, so Enter never inserts a newline
                let focused = ui.memory(|m| m.has_focus(composer_id));
                let single_line = !self.input.message_input.contains('\n');
                let (enter, up, down, escape) = if focused {
                    ui.input_mut(|i| {
                        (
                            i.consume_key(egui::Modifiers::NONE, egui::Key::Enter),
                            single_line && i.consume_key(egui::Modifiers::NONE, egui::Key::ArrowUp),
                            single_line && i.consume_key(egui::Modifiers::NONE, egui::Key::ArrowDown),
                            i.consume_key(egui::Modifiers::NONE, egui::Key::Escape),
                        )
                    })
                } else {
                    (false, false, false, false)
                };

                if up {
                    self.input.history_up();
                }
                if down {
                    self.input.history_down();
                }
                if escape {
                    self.input.cancel();
                }
                if enter {
                    submitted = self.input.submit();
                }

                let hint = match self.input.mode {
                    ComposerMode::Edit { .. } => "Edit message... (Enter to save, Esc to cancel)",
                    _ => "Type a message... (Enter to send, Shift+Enter for a new line)",
                };
                let input_frame = egui::Frame::new()
                    .fill(theme.surface[2])
                    .corner_radius(6.0)
                    .inner_margin(egui::Margin::symmetric(10, 8));
                let response = input_frame
                    .show(ui, |ui| {
                        ui.add(
                            egui::TextEdit::multiline(&mut self.input.message_input)
                                .id(composer_id)
                                .desired_rows(1)
                                .desired_width(f32::INFINITY)
                                .frame(false)
                                .hint_text(hint),
                        )
                    })
                    .inner;

                if response.changed() {
                    self.input.error = None;
                }
                // Keep typing focus in the composer unless another widget took it
                let idle = !focused && ui.memory(|m| m.focused().is_none());
                if enter || (idle && self.state.active.is_some()) {
                    response.request_focus();
                }

                if let Some(error) = &self.input.error {
                    ui.label(egui::RichText::new(error).size(12.0).color(theme.error));
                }
            });

        if let Some(submission) = submitted {
            self.dispatch_submission(submission);
        }
    }

    /// Reply / edit indicator above the input. Returns whether its close
    /// button was clicked.
    fn render_mode_banner(&self, ui: &mut egui::Ui) -> bool {
        let text = match &self.input.mode {
            ComposerMode::Compose => return false,
            ComposerMode::Reply {
                author, preview, ..
            } => format!("↩ Replying to {author}: {preview}"),
            ComposerMode::Edit { .. } => "✏ Editing message".to_string(),
        };
        let mut close = false;
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new(text)
                    .size(12.0)
                    .color(self.theme.text_secondary),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                close = ui.small_button("✕").on_hover_text("Cancel (Esc)").clicked();
            });
        });
        close
    }

    fn dispatch_submission(&mut self, submission: Submission) {
        match submission {
            Submission::Send { body, reply_to } => {
                self.settings.remember(&body);
                if let Some(action) = self.state.send_message(body, reply_to) {
                    self.send(action);
                }
            }
            Submission::Edit { message_id, body } => {
                let Some(conversation) = self.state.active.clone() else {
                    return;
                };
                self.send(BackendAction::EditMessage {
                    conversation,
                    message_id,
                    body,
                });
            }
        }
    }
}
