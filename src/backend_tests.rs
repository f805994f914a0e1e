//! Backend tests: the action loop against the in-memory store

use chrono::{TimeZone, Utc};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::backend::{run_backend, BackendOptions, MemoryStore};
use crate::message::Message;
use crate::protocol::{BackendAction, GuiEvent};

const TIMEOUT: Duration = Duration::from_secs(2);

fn options() -> BackendOptions {
    BackendOptions {
        user_id: "me".into(),
        latency: Duration::ZERO,
        auto_reply: false,
        reply_delay: Duration::ZERO,
    }
}

fn fixtures() -> MemoryStore {
    MemoryStore::with_fixtures("me", Utc.timestamp_opt(1_700_000_000, 0).unwrap())
}

fn spawn(
    store: MemoryStore,
    options: BackendOptions,
) -> (Sender<BackendAction>, Receiver<GuiEvent>, JoinHandle<()>) {
    let (action_tx, action_rx) = unbounded::<BackendAction>();
    let (event_tx, event_rx) = unbounded::<GuiEvent>();
    let handle = std::thread::spawn(move || run_backend(action_rx, event_tx, store, options));
    (action_tx, event_rx, handle)
}

fn fetch(conversation: &str, before: Option<String>, generation: u64) -> BackendAction {
    BackendAction::FetchHistory {
        conversation: conversation.into(),
        before,
        limit: 50,
        generation,
    }
}

#[test]
fn test_list_conversations() {
    let (action_tx, event_rx, handle) = spawn(fixtures(), options());
    action_tx.send(BackendAction::ListConversations).unwrap();

    match event_rx.recv_timeout(TIMEOUT) {
        Ok(GuiEvent::Conversations(list)) => {
            let ids: Vec<_> = list.iter().map(|c| c.id.as_str()).collect();
            assert_eq!(ids, vec!["general", "alice", "release", "quiet"]);
        }
        other => panic!("Expected Conversations, got {other:?}"),
    }

    action_tx.send(BackendAction::Shutdown).unwrap();
    handle.join().unwrap();
}

#[test]
fn test_history_pages_chain_without_overlap() {
    let (action_tx, event_rx, handle) = spawn(fixtures(), options());

    action_tx.send(fetch("general", None, 7)).unwrap();
    let Ok(GuiEvent::HistoryLoaded {
        generation,
        page: first,
        ..
    }) = event_rx.recv_timeout(TIMEOUT)
    else {
        panic!("Expected first page");
    };
    // The generation is echoed back untouched
    assert_eq!(generation, 7);
    assert_eq!(first.messages.len(), 50);
    assert!(first.has_more);

    let oldest = first.messages[0].id.clone();
    action_tx.send(fetch("general", Some(oldest.clone()), 7)).unwrap();
    let Ok(GuiEvent::HistoryLoaded { page: second, .. }) = event_rx.recv_timeout(TIMEOUT) else {
        panic!("Expected second page");
    };
    assert_eq!(second.messages.len(), 50);
    let newest_of_second = &second.messages[second.messages.len() - 1];
    assert!(newest_of_second.created_at <= first.messages[0].created_at);
    assert!(second.messages.iter().all(|m| m.id != oldest));

    drop(action_tx);
    handle.join().unwrap();
}

#[test]
fn test_failed_fetch_then_retry() {
    let mut store = fixtures();
    store.fail_next_fetches(1);
    let (action_tx, event_rx, handle) = spawn(store, options());

    action_tx.send(fetch("alice", None, 1)).unwrap();
    match event_rx.recv_timeout(TIMEOUT) {
        Ok(GuiEvent::HistoryFailed {
            conversation,
            generation,
            reason,
        }) => {
            assert_eq!(conversation, "alice");
            assert_eq!(generation, 1);
            assert!(!reason.is_empty());
        }
        other => panic!("Expected HistoryFailed, got {other:?}"),
    }

    action_tx.send(fetch("alice", None, 1)).unwrap();
    match event_rx.recv_timeout(TIMEOUT) {
        Ok(GuiEvent::HistoryLoaded { page, .. }) => {
            assert_eq!(page.messages.len(), 36);
            assert!(!page.has_more);
        }
        other => panic!("Expected HistoryLoaded, got {other:?}"),
    }

    action_tx.send(BackendAction::Shutdown).unwrap();
    handle.join().unwrap();
}

#[test]
fn test_unknown_conversation_fails_history() {
    let (action_tx, event_rx, handle) = spawn(fixtures(), options());
    action_tx.send(fetch("nope", None, 3)).unwrap();
    assert!(matches!(
        event_rx.recv_timeout(TIMEOUT),
        Ok(GuiEvent::HistoryFailed { generation: 3, .. })
    ));
    action_tx.send(BackendAction::Shutdown).unwrap();
    handle.join().unwrap();
}

#[test]
fn test_send_confirms_and_peer_replies() {
    let options = BackendOptions {
        auto_reply: true,
        reply_delay: Duration::from_millis(10),
        ..options()
    };
    let (action_tx, event_rx, handle) = spawn(fixtures(), options);

    action_tx
        .send(BackendAction::SendMessage {
            conversation: "alice".into(),
            local_id: "local-1".into(),
            body: "ping".into(),
            reply_to: None,
        })
        .unwrap();

    match event_rx.recv_timeout(TIMEOUT) {
        Ok(GuiEvent::MessageSent {
            local_id, message, ..
        }) => {
            assert_eq!(local_id, "local-1");
            assert_eq!(message.author, "me");
            assert_eq!(message.body, "ping");
            assert!(message.id.starts_with("alice:"));
        }
        other => panic!("Expected MessageSent, got {other:?}"),
    }
    match event_rx.recv_timeout(TIMEOUT) {
        Ok(GuiEvent::MessageReceived {
            conversation,
            message,
        }) => {
            assert_eq!(conversation, "alice");
            assert_eq!(message.author, "alice");
        }
        other => panic!("Expected MessageReceived, got {other:?}"),
    }

    action_tx.send(BackendAction::Shutdown).unwrap();
    handle.join().unwrap();
}

#[test]
fn test_send_to_unknown_conversation_fails() {
    let (action_tx, event_rx, handle) = spawn(fixtures(), options());
    action_tx
        .send(BackendAction::SendMessage {
            conversation: "nope".into(),
            local_id: "local-9".into(),
            body: "hello".into(),
            reply_to: None,
        })
        .unwrap();
    match event_rx.recv_timeout(TIMEOUT) {
        Ok(GuiEvent::SendFailed { local_id, .. }) => assert_eq!(local_id, "local-9"),
        other => panic!("Expected SendFailed, got {other:?}"),
    }
    action_tx.send(BackendAction::Shutdown).unwrap();
    handle.join().unwrap();
}

#[test]
fn test_edit_react_and_delete_own_message() {
    let (action_tx, event_rx, handle) = spawn(MemoryStore::with_fixtures("me", Utc::now()), options());
    action_tx
        .send(BackendAction::SendMessage {
            conversation: "quiet".into(),
            local_id: "local-1".into(),
            body: "draft".into(),
            reply_to: None,
        })
        .unwrap();
    let Ok(GuiEvent::MessageSent { message, .. }) = event_rx.recv_timeout(TIMEOUT) else {
        panic!("Expected MessageSent");
    };
    let id = message.id;

    action_tx
        .send(BackendAction::EditMessage {
            conversation: "quiet".into(),
            message_id: id.clone(),
            body: "final".into(),
        })
        .unwrap();
    match event_rx.recv_timeout(TIMEOUT) {
        Ok(GuiEvent::MessageUpdated { message, .. }) => {
            assert_eq!(message.body, "final");
            assert!(message.edited_at.is_some());
        }
        other => panic!("Expected MessageUpdated, got {other:?}"),
    }

    action_tx
        .send(BackendAction::ToggleReaction {
            conversation: "quiet".into(),
            message_id: id.clone(),
            emoji: "🎉".into(),
        })
        .unwrap();
    match event_rx.recv_timeout(TIMEOUT) {
        Ok(GuiEvent::MessageUpdated { message, .. }) => {
            assert_eq!(message.reactions.len(), 1);
            assert_eq!(message.reactions[0].emoji, "🎉");
        }
        other => panic!("Expected MessageUpdated, got {other:?}"),
    }

    action_tx
        .send(BackendAction::DeleteMessage {
            conversation: "quiet".into(),
            message_id: id.clone(),
        })
        .unwrap();
    match event_rx.recv_timeout(TIMEOUT) {
        Ok(GuiEvent::MessageDeleted { message_id, .. }) => assert_eq!(message_id, id),
        other => panic!("Expected MessageDeleted, got {other:?}"),
    }

    action_tx.send(BackendAction::Shutdown).unwrap();
    handle.join().unwrap();
}

#[test]
fn test_editing_someone_elses_message_reports_error() {
    let mut store = MemoryStore::new();
    store.add_conversation("dm", "Alice", vec!["me".into(), "alice".into()]);
    let theirs = store
        .insert("dm", Message::new("", "alice", "hi", Utc::now()))
        .unwrap();
    let (action_tx, event_rx, handle) = spawn(store, options());

    action_tx
        .send(BackendAction::EditMessage {
            conversation: "dm".into(),
            message_id: theirs.id.clone(),
            body: "hijacked".into(),
        })
        .unwrap();
    assert!(matches!(event_rx.recv_timeout(TIMEOUT), Ok(GuiEvent::Error(_))));

    action_tx
        .send(BackendAction::DeleteMessage {
            conversation: "dm".into(),
            message_id: theirs.id,
        })
        .unwrap();
    assert!(matches!(event_rx.recv_timeout(TIMEOUT), Ok(GuiEvent::Error(_))));

    action_tx.send(BackendAction::Shutdown).unwrap();
    handle.join().unwrap();
}

#[test]
fn test_latency_delays_results() {
    let options = BackendOptions {
        latency: Duration::from_millis(150),
        ..options()
    };
    let (action_tx, event_rx, handle) = spawn(fixtures(), options);
    let started = std::time::Instant::now();
    action_tx.send(BackendAction::ListConversations).unwrap();
    assert!(matches!(
        event_rx.recv_timeout(TIMEOUT),
        Ok(GuiEvent::Conversations(_))
    ));
    assert!(started.elapsed() >= Duration::from_millis(150));

    action_tx.send(BackendAction::Shutdown).unwrap();
    handle.join().unwrap();
}
