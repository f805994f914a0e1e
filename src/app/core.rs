//! Core ChatApp struct definition and initialization

use chrono::Utc;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::thread;

use crate::backend::{run_backend, BackendOptions, MemoryStore};
use crate::config::{load_settings, save_settings, Settings};
use crate::input_state::InputState;
use crate::protocol::{BackendAction, GuiEvent};
use crate::state::ClientState;
use crate::transcript::Transcript;
use crate::ui;
use crate::ui::theme::ChatTheme;

pub struct ChatApp {
    // Core state (buffers, mounted list, toasts)
    pub state: ClientState,

    // Persisted settings, written back on exit
    pub settings: Settings,

    // Channels for backend communication
    pub action_tx: Sender<BackendAction>,
    pub event_rx: Receiver<GuiEvent>,

    // Composer state (text, reply / edit mode, history)
    pub input: InputState,

    pub theme: ChatTheme,

    // UI visibility toggles
    pub show_sidebar: bool,
    pub sidebar_filter: String,

    backend: Option<thread::JoinHandle<()>>,
}

impl ChatApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = load_settings().unwrap_or_default();
        let theme = ChatTheme::from_name(&settings.theme);
        ui::theme::apply_app_style(&cc.egui_ctx, &theme);
        Self::with_settings(settings, theme)
    }

    /// Build the app and start the backend thread with the fixture store.
    pub fn with_settings(settings: Settings, theme: ChatTheme) -> Self {
        // Create channels for UI <-> Backend
        let (action_tx, action_rx) = unbounded::<BackendAction>();
        let (event_tx, event_rx) = unbounded::<GuiEvent>();

        let mut store = MemoryStore::with_fixtures(&settings.user_id, Utc::now());
        if settings.fail_first_history_fetch {
            store.fail_next_fetches(1);
        }
        let options = BackendOptions::from_settings(&settings);

        // Spawn the backend thread
        let backend = thread::Builder::new()
            .name("ichat-backend".into())
            .spawn(move || run_backend(action_rx, event_tx, store, options));
        let backend = match backend {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::error!("failed to spawn backend thread: {e}");
                None
            }
        };

        let mut state = ClientState::new(&settings);
        if settings.transcripts {
            match Transcript::new() {
                Ok(transcript) => state.transcript = Some(transcript),
                Err(e) => log::warn!("transcripts disabled: {e}"),
            }
        }

        let app = Self {
            state,
            input: InputState::with_history(settings.history.clone()),
            settings,
            action_tx,
            event_rx,
            theme,
            show_sidebar: true,
            sidebar_filter: String::new(),
            backend,
        };
        app.send(BackendAction::ListConversations);
        app
    }

    /// Queue an action for the backend.
    pub(super) fn send(&self, action: BackendAction) {
        if self.action_tx.send(action).is_err() {
            log::warn!("backend is gone; action dropped");
        }
    }

    /// Switch the theme and remember it in the settings.
    pub(super) fn set_theme(&mut self, ctx: &eframe::egui::Context, name: &str) {
        self.theme = ChatTheme::from_name(name);
        self.settings.theme = self.theme.name.to_string();
        ui::theme::apply_app_style(ctx, &self.theme);
    }

    fn save(&self) {
        if let Err(e) = save_settings(&self.settings) {
            log::warn!("failed to save settings: {e}");
        }
    }
}

impl Drop for ChatApp {
    fn drop(&mut self) {
        self.save();
        self.send(BackendAction::Shutdown);
        if let Some(handle) = self.backend.take() {
            if handle.join().is_err() {
                log::warn!("backend thread panicked");
            }
        }
        if let Some(transcript) = self.state.transcript.take() {
            transcript.close();
        }
    }
}
