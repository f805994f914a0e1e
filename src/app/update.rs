//! Main update loop and global shortcuts

use eframe::egui;
use std::time::Duration;

use super::ChatApp;
use crate::ui;

/// Seconds a status toast stays on screen
const TOAST_SECS: u64 = 4;

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Process backend events
        self.process_events();

        // Global keyboard shortcuts (work even when input doesn't have focus)
        let (next, prev, toggle_sidebar) = ctx.input(|i| {
            (
                i.modifiers.ctrl && i.key_pressed(egui::Key::N),
                i.modifiers.ctrl && i.key_pressed(egui::Key::P),
                i.modifiers.ctrl && i.key_pressed(egui::Key::B),
            )
        });
        if next || prev {
            if let Some(id) = self.state.adjacent_conversation(next) {
                self.open_conversation(&id);
            }
        }
        if toggle_sidebar {
            self.show_sidebar = !self.show_sidebar;
        }

        // Request repaint to keep checking for events
        ctx.request_repaint_after(Duration::from_millis(100));
        self.state.purge_old_status_messages(TOAST_SECS);

        self.render_menu_bar(ctx);

        if self.show_sidebar {
            if let Some(id) =
                ui::sidebar::render_sidebar(ctx, &self.state, &mut self.sidebar_filter, &self.theme)
            {
                self.open_conversation(&id);
            }
        }

        // Bottom panel before the central one so the list gets the rest
        self.render_input_panel(ctx);
        self.render_central_panel(ctx);

        ui::toasts::render_status_toasts(ctx, &self.state.status_messages, &self.theme);
    }
}

impl ChatApp {
    /// Mount another conversation. The composer leaves reply / edit mode
    /// since those target messages of the previous one.
    pub(super) fn open_conversation(&mut self, id: &str) {
        if !matches!(self.input.mode, crate::input_state::ComposerMode::Compose) {
            self.input.cancel();
        }
        if let Some(action) = self.state.open_conversation(id) {
            self.send(action);
        }
    }
}
