//! Backend main event loop: polls UI actions and runs them on a Tokio runtime.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use tokio::runtime::Runtime;
use tokio::sync::Mutex;

use super::handlers::{self, Context};
use super::store::MessageStore;
use crate::config::Settings;
use crate::protocol::{BackendAction, GuiEvent};

/// How often the loop checks for new actions when idle
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Runtime behaviour of the simulated backend.
#[derive(Debug, Clone)]
pub struct BackendOptions {
    /// Author id for the local user's sends, edits and reactions
    pub user_id: String,
    /// Delay applied before every store operation
    pub latency: Duration,
    /// The conversation peer answers the user's messages
    pub auto_reply: bool,
    pub reply_delay: Duration,
}

impl Default for BackendOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl BackendOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            user_id: settings.user_id.clone(),
            latency: Duration::from_millis(settings.latency_ms),
            auto_reply: settings.auto_reply,
            reply_delay: Duration::from_millis(settings.reply_delay_ms),
        }
    }
}

/// Run the backend event loop on a tokio runtime.
///
/// Returns when a [`BackendAction::Shutdown`] arrives or the UI side of the
/// channel is dropped.
pub fn run_backend<S>(
    action_rx: Receiver<BackendAction>,
    event_tx: Sender<GuiEvent>,
    store: S,
    options: BackendOptions,
) where
    S: MessageStore + 'static,
{
    // Create a Tokio runtime for this thread
    let rt = match Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            let _ = event_tx.send(GuiEvent::Error(format!(
                "Failed to create Tokio runtime: {}",
                e
            )));
            return;
        }
    };

    let ctx = Context {
        store: Arc::new(Mutex::new(store)),
        event_tx,
        options,
    };

    rt.block_on(async move {
        log::info!("backend started for user {}", ctx.options.user_id);
        'outer: loop {
            // Check for actions from the UI (non-blocking)
            loop {
                match action_rx.try_recv() {
                    Ok(BackendAction::Shutdown) => break 'outer,
                    Ok(action) => {
                        let ctx = ctx.clone();
                        tokio::spawn(async move {
                            handlers::handle_backend_action(action, ctx).await;
                        });
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => break 'outer,
                }
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
        log::info!("backend stopped");
    });
}
