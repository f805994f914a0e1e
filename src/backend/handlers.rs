//! Handlers for backend actions. Each runs in its own task after the
//! configured latency.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;
use tokio::sync::Mutex;

use super::main_loop::BackendOptions;
use super::store::{MessageStore, PageRequest};
use crate::protocol::{BackendAction, GuiEvent};

const CANNED_REPLIES: &[&str] = &[
    "Got it, thanks!",
    "Hmm, let me think about that.",
    "Sounds good 👍",
    "Can you say more? I'm not sure I follow.",
    "Ha, yes.",
    "I'll take a look after lunch and get back to you with a proper answer, there are a couple of things I want to double check first.",
];

static REPLY_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Shared handles every action task needs.
pub(super) struct Context<S> {
    pub store: Arc<Mutex<S>>,
    pub event_tx: Sender<GuiEvent>,
    pub options: BackendOptions,
}

impl<S> Clone for Context<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            event_tx: self.event_tx.clone(),
            options: self.options.clone(),
        }
    }
}

/// Handle a backend action from the GUI
pub(super) async fn handle_backend_action<S>(action: BackendAction, ctx: Context<S>)
where
    S: MessageStore + 'static,
{
    if !ctx.options.latency.is_zero() {
        tokio::time::sleep(ctx.options.latency).await;
    }
    let user = ctx.options.user_id.as_str();

    match action {
        BackendAction::ListConversations => {
            let list = ctx.store.lock().await.conversations();
            let _ = ctx.event_tx.send(GuiEvent::Conversations(list));
        }
        BackendAction::FetchHistory {
            conversation,
            before,
            limit,
            generation,
        } => {
            let request = PageRequest { before, limit };
            let result = ctx.store.lock().await.fetch_page(&conversation, &request);
            let event = match result {
                Ok(page) => {
                    log::debug!(
                        "history {conversation}: {} messages, has_more {}",
                        page.messages.len(),
                        page.has_more
                    );
                    GuiEvent::HistoryLoaded {
                        conversation,
                        generation,
                        page,
                    }
                }
                Err(e) => {
                    log::warn!("history fetch for {conversation} failed: {e}");
                    GuiEvent::HistoryFailed {
                        conversation,
                        generation,
                        reason: e.to_string(),
                    }
                }
            };
            let _ = ctx.event_tx.send(event);
        }
        BackendAction::SendMessage {
            conversation,
            local_id,
            body,
            reply_to,
        } => {
            let result = ctx
                .store
                .lock()
                .await
                .send(&conversation, user, &body, reply_to);
            match result {
                Ok(message) => {
                    let _ = ctx.event_tx.send(GuiEvent::MessageSent {
                        conversation: conversation.clone(),
                        local_id,
                        message,
                    });
                    if ctx.options.auto_reply {
                        let ctx = ctx.clone();
                        tokio::spawn(async move {
                            auto_reply(conversation, ctx).await;
                        });
                    }
                }
                Err(e) => {
                    log::warn!("send to {conversation} failed: {e}");
                    let _ = ctx.event_tx.send(GuiEvent::SendFailed {
                        conversation,
                        local_id,
                        reason: e.to_string(),
                    });
                }
            }
        }
        BackendAction::EditMessage {
            conversation,
            message_id,
            body,
        } => {
            let result = ctx
                .store
                .lock()
                .await
                .edit(&conversation, &message_id, user, &body);
            send_update(&ctx.event_tx, conversation, result);
        }
        BackendAction::DeleteMessage {
            conversation,
            message_id,
        } => {
            let result = ctx.store.lock().await.delete(&conversation, &message_id, user);
            let event = match result {
                Ok(()) => GuiEvent::MessageDeleted {
                    conversation,
                    message_id,
                },
                Err(e) => GuiEvent::Error(format!("Delete failed: {e}")),
            };
            let _ = ctx.event_tx.send(event);
        }
        BackendAction::ToggleReaction {
            conversation,
            message_id,
            emoji,
        } => {
            let result = ctx
                .store
                .lock()
                .await
                .react(&conversation, &message_id, user, &emoji);
            send_update(&ctx.event_tx, conversation, result);
        }
        // Handled by the loop itself
        BackendAction::Shutdown => {}
    }
}

fn send_update(
    event_tx: &Sender<GuiEvent>,
    conversation: String,
    result: Result<crate::message::Message, crate::error::StoreError>,
) {
    let event = match result {
        Ok(message) => GuiEvent::MessageUpdated {
            conversation,
            message,
        },
        Err(e) => {
            log::warn!("update in {conversation} failed: {e}");
            GuiEvent::Error(e.to_string())
        }
    };
    let _ = event_tx.send(event);
}

/// The conversation peer answers after `reply_delay`.
async fn auto_reply<S>(conversation: String, ctx: Context<S>)
where
    S: MessageStore + 'static,
{
    tokio::time::sleep(ctx.options.reply_delay).await;

    let mut store = ctx.store.lock().await;
    let Some(peer) = store.peer_of(&conversation, &ctx.options.user_id) else {
        return;
    };

    let n = REPLY_COUNTER.fetch_add(1, Ordering::Relaxed);
    let body = CANNED_REPLIES[n % CANNED_REPLIES.len()];
    match store.send(&conversation, &peer, body, None) {
        Ok(message) => {
            let _ = ctx.event_tx.send(GuiEvent::MessageReceived {
                conversation,
                message,
            });
        }
        Err(e) => log::warn!("auto reply in {conversation} failed: {e}"),
    }
}
