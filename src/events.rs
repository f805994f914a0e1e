//! Backend event processing (history pages, sends, incoming messages).

use crossbeam_channel::Receiver;

use crate::buffer::LoadState;
use crate::list::row::contains_mention;
use crate::protocol::{BackendAction, GuiEvent};
use crate::state::ClientState;
use crate::transcript::TranscriptEntry;

/// Process all pending events from the backend. Returns follow-up actions.
pub fn process_events(event_rx: &Receiver<GuiEvent>, state: &mut ClientState) -> Vec<BackendAction> {
    let mut actions = Vec::new();
    // Drain all pending events from the backend
    while let Ok(event) = event_rx.try_recv() {
        actions.extend(process_single_event(state, event));
    }
    actions
}

/// Apply one backend event to the client state.
pub fn process_single_event(state: &mut ClientState, event: GuiEvent) -> Option<BackendAction> {
    match event {
        GuiEvent::Conversations(list) => {
            state.upsert_conversations(list);
            if state.active.is_none() {
                let first = state.conversation_order.first().cloned()?;
                return state.open_conversation(&first);
            }
        }

        GuiEvent::HistoryLoaded {
            conversation,
            generation,
            page,
        } => {
            if !is_current(state, &conversation, generation) {
                log::debug!(
                    "discarding stale history for {conversation} (generation {generation}, mounted {})",
                    state.generation
                );
                return None;
            }
            if let Some(buffer) = state.buffers.get_mut(&conversation) {
                buffer.prepend_page(page);
            }
            if let Some(list) = state.list.as_mut() {
                list.clear_load_failure();
            }
            state.banner = None;
        }

        GuiEvent::HistoryFailed {
            conversation,
            generation,
            reason,
        } => {
            if !is_current(state, &conversation, generation) {
                log::debug!("discarding stale history failure for {conversation}: {reason}");
                return None;
            }
            if let Some(buffer) = state.buffers.get_mut(&conversation) {
                buffer.load = LoadState::Failed(reason.clone());
            }
            if let Some(list) = state.list.as_mut() {
                list.load_failed(reason.clone());
            }
            state.banner = Some(format!("Couldn't load messages: {reason}"));
        }

        GuiEvent::MessageSent {
            conversation,
            local_id,
            message,
        } => {
            record_transcript(state, &conversation, &message);
            if let Some(buffer) = state.buffers.get_mut(&conversation) {
                buffer.confirm(&local_id, message);
            }
        }

        GuiEvent::SendFailed {
            conversation,
            local_id,
            reason,
        } => {
            if let Some(buffer) = state.buffers.get_mut(&conversation) {
                buffer.mark_failed(&local_id);
            }
            state.toast(format!("Message not sent: {reason}"));
        }

        GuiEvent::MessageReceived {
            conversation,
            message,
        } => {
            record_transcript(state, &conversation, &message);
            let is_active = state.active.as_deref() == Some(conversation.as_str());
            let mention = contains_mention(&message.body, &state.display_name)
                || contains_mention(&message.body, &state.user_id);
            let author = message.author.clone();
            let Some(buffer) = state.buffers.get_mut(&conversation) else {
                log::debug!("message for unknown conversation {conversation}");
                return None;
            };
            let title = buffer.title.clone();
            if buffer.push(message, is_active, mention) && !is_active && mention {
                state.toast(format!("{author} mentioned you in {title}"));
            }
        }

        GuiEvent::MessageUpdated {
            conversation,
            message,
        } => {
            if let Some(buffer) = state.buffers.get_mut(&conversation) {
                buffer.replace(message);
            }
        }

        GuiEvent::MessageDeleted {
            conversation,
            message_id,
        } => {
            if let Some(buffer) = state.buffers.get_mut(&conversation) {
                buffer.remove(&message_id);
            }
        }

        GuiEvent::Error(msg) => {
            log::warn!("backend error: {msg}");
            state.toast(format!("Error: {msg}"));
        }
    }
    None
}

/// Whether a history result belongs to the list that is mounted now.
fn is_current(state: &ClientState, conversation: &str, generation: u64) -> bool {
    state.list.is_some()
        && state.generation == generation
        && state.active.as_deref() == Some(conversation)
}

fn record_transcript(state: &ClientState, conversation: &str, message: &crate::message::Message) {
    if let Some(transcript) = &state.transcript {
        transcript.record(TranscriptEntry::from_message(conversation, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::message::{ConversationSummary, Message, Page};
    use chrono::{TimeZone, Utc};

    fn msg(id: &str, author: &str, secs: i64, body: &str) -> Message {
        Message::new(id, author, body, Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap())
    }

    fn state_with(ids: &[&str]) -> ClientState {
        let mut state = ClientState::new(&Settings::default());
        let list = ids
            .iter()
            .map(|id| ConversationSummary {
                id: id.to_string(),
                title: id.to_string(),
                participants: vec!["me".into(), "bob".into()],
                last_activity: None,
            })
            .collect();
        assert!(matches!(
            process_single_event(&mut state, GuiEvent::Conversations(list)),
            Some(BackendAction::FetchHistory { .. })
        ));
        state
    }

    #[test]
    fn test_conversations_open_first() {
        let state = state_with(&["a", "b"]);
        assert_eq!(state.active.as_deref(), Some("a"));
        assert!(state.buffers["a"].is_loading());
    }

    #[test]
    fn test_history_for_current_generation_is_applied() {
        let mut state = state_with(&["a"]);
        let generation = state.generation;
        process_single_event(
            &mut state,
            GuiEvent::HistoryLoaded {
                conversation: "a".into(),
                generation,
                page: Page {
                    messages: vec![msg("1", "bob", 0, "hi")],
                    has_more: false,
                },
            },
        );
        let buffer = &state.buffers["a"];
        assert_eq!(buffer.messages.len(), 1);
        assert!(!buffer.has_more);
        assert!(!buffer.is_loading());
    }

    #[test]
    fn test_stale_history_is_discarded() {
        let mut state = state_with(&["a", "b"]);
        let old_generation = state.generation;
        state.open_conversation("b");

        let result = process_single_event(
            &mut state,
            GuiEvent::HistoryLoaded {
                conversation: "a".into(),
                generation: old_generation,
                page: Page {
                    messages: vec![msg("1", "bob", 0, "hi")],
                    has_more: false,
                },
            },
        );
        assert!(result.is_none());
        assert!(state.buffers["a"].messages.is_empty());

        // Same conversation, remounted: still stale
        state.open_conversation("a");
        process_single_event(
            &mut state,
            GuiEvent::HistoryFailed {
                conversation: "a".into(),
                generation: old_generation,
                reason: "late".into(),
            },
        );
        assert!(state.banner.is_none());
        assert!(state.list.as_ref().unwrap().load_failure().is_none());
    }

    #[test]
    fn test_history_failure_latches_and_shows_banner() {
        let mut state = state_with(&["a"]);
        let generation = state.generation;
        process_single_event(
            &mut state,
            GuiEvent::HistoryFailed {
                conversation: "a".into(),
                generation,
                reason: "store unavailable".into(),
            },
        );
        assert_eq!(
            state.buffers["a"].load,
            LoadState::Failed("store unavailable".into())
        );
        assert!(state.banner.as_deref().unwrap().contains("store unavailable"));
        assert_eq!(
            state.list.as_ref().unwrap().load_failure(),
            Some("store unavailable")
        );
    }

    #[test]
    fn test_send_confirm_and_failure() {
        let mut state = state_with(&["a"]);
        let Some(BackendAction::SendMessage { local_id, .. }) = state.send_message("one".into(), None)
        else {
            panic!("expected send");
        };
        let mut stored = msg("a:000001", "me", 0, "one");
        stored.created_at = state.buffers["a"].messages[0].created_at;
        process_single_event(
            &mut state,
            GuiEvent::MessageSent {
                conversation: "a".into(),
                local_id,
                message: stored,
            },
        );
        assert_eq!(state.buffers["a"].messages[0].id, "a:000001");
        assert!(!state.buffers["a"].messages[0].pending);

        let Some(BackendAction::SendMessage { local_id, .. }) = state.send_message("two".into(), None)
        else {
            panic!("expected send");
        };
        process_single_event(
            &mut state,
            GuiEvent::SendFailed {
                conversation: "a".into(),
                local_id,
                reason: "offline".into(),
            },
        );
        assert!(state.buffers["a"].messages[1].failed);
        assert_eq!(state.status_messages.len(), 1);
    }

    #[test]
    fn test_incoming_in_background_counts_unread_and_mentions() {
        let mut state = state_with(&["a", "b"]);
        process_single_event(
            &mut state,
            GuiEvent::MessageReceived {
                conversation: "b".into(),
                message: msg("b:1", "bob", 0, "hey Me, look"),
            },
        );
        let buffer = &state.buffers["b"];
        assert_eq!(buffer.unread_count, 1);
        assert!(buffer.has_mention);
        assert_eq!(state.status_messages.len(), 1);

        process_single_event(
            &mut state,
            GuiEvent::MessageReceived {
                conversation: "a".into(),
                message: msg("a:1", "bob", 0, "plain"),
            },
        );
        assert_eq!(state.buffers["a"].unread_count, 0);
    }

    #[test]
    fn test_update_and_delete() {
        let mut state = state_with(&["a"]);
        let generation = state.generation;
        process_single_event(
            &mut state,
            GuiEvent::HistoryLoaded {
                conversation: "a".into(),
                generation,
                page: Page {
                    messages: vec![msg("1", "bob", 0, "hi"), msg("2", "bob", 5, "there")],
                    has_more: false,
                },
            },
        );
        let mut edited = msg("1", "bob", 0, "hello");
        edited.toggle_reaction("👍", "me");
        process_single_event(
            &mut state,
            GuiEvent::MessageUpdated {
                conversation: "a".into(),
                message: edited,
            },
        );
        assert_eq!(state.buffers["a"].messages[0].body, "hello");
        assert_eq!(state.buffers["a"].messages[0].reactions.len(), 1);

        process_single_event(
            &mut state,
            GuiEvent::MessageDeleted {
                conversation: "a".into(),
                message_id: "2".into(),
            },
        );
        assert_eq!(state.buffers["a"].messages.len(), 1);
    }
}
