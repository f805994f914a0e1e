//! Menu bar, conversation header and central panel rendering

use eframe::egui;

use crate::app::ChatApp;
use crate::list::ScrollAlign;
use crate::protocol::BackendAction;
use crate::state::ClientState;
use crate::ui::messages::{self, RowAction, RowContext};

impl ChatApp {
    /// Render the menu bar at the top of the window
    pub(in crate::app) fn render_menu_bar(&mut self, ctx: &egui::Context) {
        let theme = self.theme.clone();
        egui::TopBottomPanel::top("menu_bar")
            .frame(
                egui::Frame::new()
                    .fill(theme.surface[1])
                    .inner_margin(egui::Margin::symmetric(8, 4))
                    .stroke(egui::Stroke::new(1.0, theme.border)),
            )
            .show(ctx, |ui| {
                egui::menu::bar(ui, |ui| {
                    ui.menu_button("File", |ui| {
                        if ui.button("Quit").clicked() {
                            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                        }
                    });
                    ui.menu_button("View", |ui| {
                        if ui
                            .checkbox(&mut self.show_sidebar, "Conversation list (Ctrl+B)")
                            .clicked()
                        {
                            ui.close_menu();
                        }
                        ui.separator();
                        for name in ["dark", "light"] {
                            if ui
                                .radio(self.theme.name == name, format!("{name} theme"))
                                .clicked()
                            {
                                self.set_theme(ctx, name);
                                ui.close_menu();
                            }
                        }
                    });
                    ui.menu_button("Help", |ui| {
                        ui.label("Ctrl+N / Ctrl+P: next / previous conversation");
                        ui.label("Ctrl+B: toggle conversation list");
                        ui.label("Up / Down: composer history");
                        ui.label("Esc: cancel reply or edit");
                        ui.label("Right-click a message for actions");
                    });
                });
            });
    }

    /// Render the active conversation: header plus the message list.
    pub(in crate::app) fn render_central_panel(&mut self, ctx: &egui::Context) {
        let theme = self.theme.clone();
        let mut actions = Vec::new();

        egui::CentralPanel::default()
            .frame(
                egui::Frame::new()
                    .fill(theme.surface[2])
                    .inner_margin(egui::Margin::symmetric(0, 6)),
            )
            .show(ctx, |ui| {
                let ClientState {
                    user_id,
                    display_name,
                    buffers,
                    active,
                    list,
                    generation,
                    banner,
                    ..
                } = &mut self.state;

                let (Some(id), Some(list)) = (active.as_deref(), list.as_mut()) else {
                    ui.centered_and_justified(|ui| {
                        ui.label(
                            egui::RichText::new("Pick a conversation")
                                .size(15.0)
                                .color(theme.text_muted),
                        );
                    });
                    return;
                };
                let Some(buffer) = buffers.get(id) else {
                    return;
                };

                ui.horizontal(|ui| {
                    ui.add_space(16.0);
                    ui.label(
                        egui::RichText::new(&buffer.title)
                            .size(16.0)
                            .strong()
                            .color(theme.text_primary),
                    );
                    ui.label(
                        egui::RichText::new(buffer.participants.join(", "))
                            .size(12.0)
                            .color(theme.text_muted),
                    );
                });
                ui.separator();

                let row_ctx = RowContext {
                    user_id: user_id.as_str(),
                    display_name: display_name.as_str(),
                    theme: &theme,
                };
                actions = messages::render_message_list(
                    ui,
                    list,
                    buffer,
                    banner.as_deref(),
                    *generation,
                    &row_ctx,
                );
            });

        for action in actions {
            self.handle_row_action(action);
        }
    }

    fn handle_row_action(&mut self, action: RowAction) {
        log::trace!("row action {action:?}");
        let Some(conversation) = self.state.active.clone() else {
            return;
        };
        match action {
            RowAction::React { message_id, emoji } => {
                self.send(BackendAction::ToggleReaction {
                    conversation,
                    message_id,
                    emoji,
                });
            }
            RowAction::Reply { message_id } => {
                if let Some(m) = self.find_message(&message_id) {
                    let (author, body) = (m.author.clone(), m.body.clone());
                    self.input.start_reply(&message_id, &author, &body);
                }
            }
            RowAction::Edit { message_id } => {
                if let Some(body) = self.find_message(&message_id).map(|m| m.body.clone()) {
                    self.input.start_edit(&message_id, &body);
                }
            }
            RowAction::Delete { message_id } => {
                self.send(BackendAction::DeleteMessage {
                    conversation,
                    message_id,
                });
            }
            RowAction::ShowMessage { message_id } => {
                if let Some(list) = self.state.list.as_mut() {
                    list.scroll_to_message(&message_id, ScrollAlign::Center);
                }
            }
            RowAction::RetryHistory => {
                if let Some(action) = self.state.retry_history() {
                    self.send(action);
                }
            }
            RowAction::LoadOlder => {
                if let Some(action) = self.state.request_history() {
                    self.send(action);
                }
            }
        }
    }

    fn find_message(&self, id: &str) -> Option<&crate::message::Message> {
        self.state
            .active_buffer()?
            .messages
            .iter()
            .find(|m| m.id == id)
    }
}
