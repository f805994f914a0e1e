//! Message store abstraction and the in-memory implementation used by the app.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};

use crate::error::StoreError;
use crate::message::{Attachment, ConversationSummary, Message, MessageKind, Page};

/// Default number of messages per history page
pub const DEFAULT_PAGE_SIZE: usize = 50;
/// Upper bound for a single page request
pub const MAX_PAGE_SIZE: usize = 200;

/// Cursor for a history request: the newest `limit` messages strictly older
/// than `before` (or the newest of the conversation when `before` is `None`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub before: Option<String>,
    pub limit: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            before: None,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Persistence seam for conversations and their messages.
pub trait MessageStore: Send {
    fn conversations(&self) -> Vec<ConversationSummary>;

    /// One page of history, ascending by creation time.
    fn fetch_page(&mut self, conversation: &str, request: &PageRequest)
        -> Result<Page, StoreError>;

    fn send(
        &mut self,
        conversation: &str,
        author: &str,
        body: &str,
        reply_to: Option<String>,
    ) -> Result<Message, StoreError>;

    fn edit(
        &mut self,
        conversation: &str,
        message_id: &str,
        author: &str,
        body: &str,
    ) -> Result<Message, StoreError>;

    fn delete(&mut self, conversation: &str, message_id: &str, author: &str)
        -> Result<(), StoreError>;

    /// Toggle `user`'s `emoji` reaction and return the updated message.
    fn react(
        &mut self,
        conversation: &str,
        message_id: &str,
        user: &str,
        emoji: &str,
    ) -> Result<Message, StoreError>;

    /// First participant of `conversation` who is not `user`.
    fn peer_of(&self, conversation: &str, user: &str) -> Option<String> {
        self.conversations()
            .into_iter()
            .find(|c| c.id == conversation)?
            .participants
            .into_iter()
            .find(|p| p != user)
    }
}

#[derive(Debug, Clone)]
struct StoredConversation {
    summary: ConversationSummary,
    messages: Vec<Message>,
    /// Soft-deleted ids; they stay valid as paging cursors
    deleted: HashSet<String>,
    next_seq: u64,
}

impl StoredConversation {
    fn new(id: &str, title: &str, participants: Vec<String>) -> Self {
        Self {
            summary: ConversationSummary {
                id: id.to_string(),
                title: title.to_string(),
                participants,
                last_activity: None,
            },
            messages: Vec::new(),
            deleted: HashSet::new(),
            next_seq: 1,
        }
    }

    fn next_id(&mut self) -> String {
        let id = format!("{}:{:06}", self.summary.id, self.next_seq);
        self.next_seq += 1;
        id
    }

    fn append(&mut self, mut message: Message) -> Message {
        message.id = self.next_id();
        self.summary.last_activity = Some(message.created_at);
        self.messages.push(message.clone());
        message
    }

    fn live_mut(&mut self, message_id: &str) -> Result<&mut Message, StoreError> {
        if self.deleted.contains(message_id) {
            return Err(StoreError::UnknownMessage(message_id.to_string()));
        }
        self.messages
            .iter_mut()
            .find(|m| m.id == message_id)
            .ok_or_else(|| StoreError::UnknownMessage(message_id.to_string()))
    }
}

/// In-memory [`MessageStore`] with deterministic fixtures.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    conversations: Vec<StoredConversation>,
    failures_pending: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with a few conversations of varying length and content.
    pub fn with_fixtures(user_id: &str, now: DateTime<Utc>) -> Self {
        let mut store = Self::new();
        let mut rng = Lcg::new(0x5eed_cafe);

        store.add_conversation(
            "general",
            "General",
            vec![user_id.to_string(), "alice".into(), "bob".into(), "carol".into()],
        );
        seed_history(&mut store, "general", user_id, 400, now, &mut rng);

        store.add_conversation("alice", "Alice", vec![user_id.to_string(), "alice".into()]);
        seed_history(&mut store, "alice", user_id, 36, now, &mut rng);

        store.add_conversation(
            "release",
            "Release planning",
            vec![user_id.to_string(), "bob".into(), "dave".into()],
        );
        seed_history(&mut store, "release", user_id, 1200, now, &mut rng);

        store.add_conversation("quiet", "Quiet room", vec![user_id.to_string(), "erin".into()]);
        store
    }

    pub fn add_conversation(&mut self, id: &str, title: &str, participants: Vec<String>) {
        if self.find(id).is_err() {
            self.conversations
                .push(StoredConversation::new(id, title, participants));
        }
    }

    /// Append a message with the given content; the store assigns the id.
    pub fn insert(&mut self, conversation: &str, message: Message) -> Result<Message, StoreError> {
        Ok(self.find_mut(conversation)?.append(message))
    }

    /// The next `n` history fetches fail with [`StoreError::Unavailable`].
    pub fn fail_next_fetches(&mut self, n: usize) {
        self.failures_pending = n;
    }

    pub fn len(&self, conversation: &str) -> usize {
        self.find(conversation)
            .map(|c| c.messages.len() - c.deleted.len())
            .unwrap_or(0)
    }

    fn find(&self, id: &str) -> Result<&StoredConversation, StoreError> {
        self.conversations
            .iter()
            .find(|c| c.summary.id == id)
            .ok_or_else(|| StoreError::UnknownConversation(id.to_string()))
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut StoredConversation, StoreError> {
        self.conversations
            .iter_mut()
            .find(|c| c.summary.id == id)
            .ok_or_else(|| StoreError::UnknownConversation(id.to_string()))
    }
}

impl MessageStore for MemoryStore {
    fn conversations(&self) -> Vec<ConversationSummary> {
        self.conversations.iter().map(|c| c.summary.clone()).collect()
    }

    fn fetch_page(
        &mut self,
        conversation: &str,
        request: &PageRequest,
    ) -> Result<Page, StoreError> {
        if self.failures_pending > 0 {
            self.failures_pending -= 1;
            return Err(StoreError::Unavailable("simulated outage".into()));
        }
        let conv = self.find(conversation)?;
        let end = match request.before.as_deref() {
            Some(before) => conv
                .messages
                .iter()
                .position(|m| m.id == before)
                .ok_or_else(|| StoreError::UnknownMessage(before.to_string()))?,
            None => conv.messages.len(),
        };

        let limit = request.limit.clamp(1, MAX_PAGE_SIZE);
        let mut page: Vec<Message> = Vec::with_capacity(limit);
        let mut start = end;
        while start > 0 && page.len() < limit {
            start -= 1;
            let candidate = &conv.messages[start];
            if !conv.deleted.contains(&candidate.id) {
                page.push(candidate.clone());
            }
        }
        page.reverse();

        let has_more = conv.messages[..start]
            .iter()
            .any(|m| !conv.deleted.contains(&m.id));
        Ok(Page {
            messages: page,
            has_more,
        })
    }

    fn send(
        &mut self,
        conversation: &str,
        author: &str,
        body: &str,
        reply_to: Option<String>,
    ) -> Result<Message, StoreError> {
        let conv = self.find_mut(conversation)?;
        if let Some(target) = reply_to.as_deref() {
            conv.live_mut(target)?;
        }
        // Keep creation times monotonic even if the wall clock steps back
        let now = Utc::now();
        let created_at = conv
            .messages
            .last()
            .map(|m| m.created_at.max(now))
            .unwrap_or(now);
        let message = Message::new("", author, body, created_at).replying_to(reply_to);
        Ok(conv.append(message))
    }

    fn edit(
        &mut self,
        conversation: &str,
        message_id: &str,
        author: &str,
        body: &str,
    ) -> Result<Message, StoreError> {
        let message = self.find_mut(conversation)?.live_mut(message_id)?;
        if message.author != author {
            return Err(StoreError::NotAuthor(message_id.to_string()));
        }
        message.body = body.to_string();
        message.edited_at = Some(Utc::now());
        Ok(message.clone())
    }

    fn delete(
        &mut self,
        conversation: &str,
        message_id: &str,
        author: &str,
    ) -> Result<(), StoreError> {
        let conv = self.find_mut(conversation)?;
        if conv.live_mut(message_id)?.author != author {
            return Err(StoreError::NotAuthor(message_id.to_string()));
        }
        conv.deleted.insert(message_id.to_string());
        Ok(())
    }

    fn react(
        &mut self,
        conversation: &str,
        message_id: &str,
        user: &str,
        emoji: &str,
    ) -> Result<Message, StoreError> {
        let message = self.find_mut(conversation)?.live_mut(message_id)?;
        message.toggle_reaction(emoji, user);
        Ok(message.clone())
    }
}

/// Small deterministic generator for fixture content.
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 33
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n.max(1)
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.below(items.len() as u64) as usize]
    }
}

const SENTENCES: &[&str] = &[
    "Morning!",
    "Did anyone look at the flaky test on main?",
    "I pushed a fix for the scroll jump, can you try it?",
    "Looks good to me.",
    "The build is green again.",
    "Can we move the sync to Thursday?",
    "I think the cache is keyed on the wrong id.",
    "Lunch?",
    "Here is the long version: the list measures each row after it is laid out, so the first frame uses the estimate and later frames correct it.",
    "ok",
    "Agreed, let's ship it.",
    "I'll write up the notes after the call.",
    "Has anyone seen the new designs yet?",
    "That was fast 🚀",
    "Checking now.",
    "We should add a retry button for that case.",
];

const FILES: &[(&str, &str, u64)] = &[
    ("screenshot.png", "image/png", 482_113),
    ("notes.md", "text/markdown", 3_912),
    ("build.log", "text/plain", 1_204_551),
    ("design.pdf", "application/pdf", 2_845_002),
];

const EMOJI: &[&str] = &["👍", "🎉", "👀", "❤️"];

fn seed_history(
    store: &mut MemoryStore,
    conversation: &str,
    user_id: &str,
    count: usize,
    now: DateTime<Utc>,
    rng: &mut Lcg,
) {
    let Ok(conv) = store.find_mut(conversation) else {
        return;
    };
    let participants = conv.summary.participants.clone();

    // Walk backwards from `now` to get realistic gaps, then append in order
    let mut stamps = Vec::with_capacity(count);
    let mut at = now - Duration::minutes(5);
    for _ in 0..count {
        stamps.push(at);
        let gap = match rng.below(10) {
            0..=5 => Duration::seconds(5 + rng.below(40) as i64),
            6..=8 => Duration::seconds(70 + rng.below(600) as i64),
            _ => Duration::hours(1 + rng.below(12) as i64),
        };
        at -= gap;
    }
    stamps.reverse();

    let mut author = participants[0].clone();
    for (i, created_at) in stamps.into_iter().enumerate() {
        // Authors write in bursts
        if rng.below(3) == 0 {
            author = participants[rng.below(participants.len() as u64) as usize].clone();
        }

        let mut body = String::new();
        for n in 0..=rng.below(3) {
            if n > 0 {
                body.push(if rng.below(4) == 0 { '\n' } else { ' ' });
            }
            body.push_str(rng.pick(SENTENCES));
        }

        let mut message = Message::new("", author.clone(), body, created_at);
        match rng.below(40) {
            0 => {
                let who = &participants[rng.below(participants.len() as u64) as usize];
                message = Message::new("", "system", format!("{who} changed the topic"), created_at)
                    .with_kind(MessageKind::System);
            }
            1 | 2 => {
                let (name, mime, size) = FILES[rng.below(FILES.len() as u64) as usize];
                message = message.with_attachment(Attachment {
                    name: name.to_string(),
                    mime_type: mime.to_string(),
                    size_bytes: size,
                });
            }
            3 | 4 if i > 0 => {
                let target = conv.messages[conv.messages.len() - 1 - rng.below(i.min(5) as u64) as usize]
                    .id
                    .clone();
                message = message.replying_to(Some(target));
            }
            _ => {}
        }
        if rng.below(8) == 0 {
            let emoji = rng.pick(EMOJI);
            for p in participants.iter().filter(|p| p.as_str() != user_id) {
                if rng.below(2) == 0 {
                    message.toggle_reaction(emoji, p);
                }
            }
        }
        if rng.below(25) == 0 {
            message.edited_at = Some(created_at + Duration::minutes(2));
        }
        conv.append(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn store_with(n: usize) -> MemoryStore {
        let mut store = MemoryStore::new();
        store.add_conversation("c", "C", vec!["me".into(), "bob".into()]);
        let base = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        for i in 0..n {
            store
                .insert("c", Message::new("", "bob", format!("m{i}"), base + Duration::seconds(i as i64)))
                .unwrap();
        }
        store
    }

    fn bodies(page: &Page) -> Vec<&str> {
        page.messages.iter().map(|m| m.body.as_str()).collect()
    }

    #[test]
    fn test_fetch_page_cursor() {
        let mut store = store_with(120);

        let newest = store.fetch_page("c", &PageRequest::default()).unwrap();
        assert_eq!(newest.messages.len(), 50);
        assert!(newest.has_more);
        assert_eq!(newest.messages[0].body, "m70");
        assert_eq!(newest.messages[49].body, "m119");

        let before = Some(newest.messages[0].id.clone());
        let older = store
            .fetch_page("c", &PageRequest { before, limit: 50 })
            .unwrap();
        assert_eq!(older.messages[0].body, "m20");
        assert_eq!(older.messages[49].body, "m69");
        assert!(older.has_more);

        let before = Some(older.messages[0].id.clone());
        let oldest = store
            .fetch_page("c", &PageRequest { before, limit: 50 })
            .unwrap();
        assert_eq!(oldest.messages.len(), 20);
        assert!(!oldest.has_more);
        assert_eq!(bodies(&oldest)[0], "m0");
    }

    #[test]
    fn test_fetch_page_skips_deleted() {
        let mut store = store_with(5);
        let page = store.fetch_page("c", &PageRequest::default()).unwrap();
        let ids: Vec<String> = page.messages.iter().map(|m| m.id.clone()).collect();

        store.delete("c", &ids[0], "bob").unwrap();
        store.delete("c", &ids[3], "bob").unwrap();
        let page = store.fetch_page("c", &PageRequest::default()).unwrap();
        assert_eq!(bodies(&page), vec!["m1", "m2", "m4"]);
        assert!(!page.has_more);

        // Deleted ids remain usable as cursors
        let request = PageRequest { before: Some(ids[3].clone()), limit: 10 };
        let page = store.fetch_page("c", &request).unwrap();
        assert_eq!(bodies(&page), vec!["m1", "m2"]);
    }

    #[test]
    fn test_failure_injection() {
        let mut store = store_with(3);
        store.fail_next_fetches(2);
        assert!(matches!(
            store.fetch_page("c", &PageRequest::default()),
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.fetch_page("c", &PageRequest::default()).is_err());
        assert!(store.fetch_page("c", &PageRequest::default()).is_ok());
    }

    #[test]
    fn test_send_edit_delete_react() {
        let mut store = store_with(1);
        let sent = store.send("c", "me", "hello", None).unwrap();
        assert_eq!(sent.id, "c:000002");

        assert_eq!(
            store.edit("c", &sent.id, "bob", "nope"),
            Err(StoreError::NotAuthor(sent.id.clone()))
        );
        let edited = store.edit("c", &sent.id, "me", "hello there").unwrap();
        assert!(edited.edited_at.is_some());

        let reacted = store.react("c", &sent.id, "bob", "👍").unwrap();
        assert_eq!(reacted.reactions[0].count(), 1);

        store.delete("c", &sent.id, "me").unwrap();
        assert!(matches!(
            store.react("c", &sent.id, "bob", "👍"),
            Err(StoreError::UnknownMessage(_))
        ));
        assert!(matches!(
            store.send("nope", "me", "x", None),
            Err(StoreError::UnknownConversation(_))
        ));
    }

    #[test]
    fn test_fixtures_are_deterministic_and_ordered() {
        let now = Utc.timestamp_opt(1_750_000_000, 0).unwrap();
        let a = MemoryStore::with_fixtures("me", now);
        let b = MemoryStore::with_fixtures("me", now);
        let mut a2 = a.clone();
        let mut b2 = b;

        let pa = a2.fetch_page("general", &PageRequest::default()).unwrap();
        let pb = b2.fetch_page("general", &PageRequest::default()).unwrap();
        assert_eq!(pa, pb);
        assert!(pa.has_more);
        assert!(pa.messages.windows(2).all(|w| w[0].created_at <= w[1].created_at));

        assert_eq!(a.len("release"), 1200);
        assert_eq!(a.peer_of("alice", "me").as_deref(), Some("alice"));
        assert_eq!(a.len("quiet"), 0);
    }
}
