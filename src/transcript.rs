//! Conversation transcripts on disk.
//!
//! Messages are queued over a channel and written by a background thread, so
//! the UI thread never touches the filesystem. Files live under the platform
//! data directory as `transcripts/<conversation>/YYYY-MM-DD.log`.

use chrono::{DateTime, Local, Utc};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crate::message::{Message, MessageKind};

/// One transcript line
#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    pub conversation: String,
    pub created_at: DateTime<Utc>,
    pub author: String,
    pub body: String,
    pub kind: MessageKind,
}

impl TranscriptEntry {
    pub fn from_message(conversation: &str, message: &Message) -> Self {
        Self {
            conversation: conversation.to_string(),
            created_at: message.created_at,
            author: message.author.clone(),
            body: message.body.clone(),
            kind: message.kind,
        }
    }
}

/// Handle to the transcript writer thread
pub struct Transcript {
    tx: Sender<TranscriptEntry>,
    handle: Option<JoinHandle<()>>,
}

impl Transcript {
    /// Writer rooted at the platform data directory
    pub fn new() -> Result<Self, String> {
        Self::with_dir(transcript_directory()?)
    }

    pub fn with_dir(dir: PathBuf) -> Result<Self, String> {
        fs::create_dir_all(&dir)
            .map_err(|e| format!("Failed to create transcript directory: {}", e))?;

        let (tx, rx) = unbounded::<TranscriptEntry>();
        let handle = thread::Builder::new()
            .name("transcript".into())
            .spawn(move || run_writer_thread(rx, dir))
            .map_err(|e| format!("Failed to start transcript thread: {}", e))?;

        Ok(Self {
            tx,
            handle: Some(handle),
        })
    }

    /// Queue an entry (non-blocking)
    pub fn record(&self, entry: TranscriptEntry) {
        // A stopped writer thread only loses transcript lines
        let _ = self.tx.send(entry);
    }

    /// Stop the writer after it drained the queue.
    pub fn close(mut self) {
        let (closed, _) = unbounded();
        drop(std::mem::replace(&mut self.tx, closed));
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Open file per conversation directory: the day it belongs to and its writer
type OpenFiles = HashMap<String, (String, BufWriter<File>)>;

fn run_writer_thread(rx: Receiver<TranscriptEntry>, dir: PathBuf) {
    let mut open_files = OpenFiles::new();

    while let Ok(entry) = rx.recv() {
        if let Err(e) = write_entry(&mut open_files, &dir, &entry) {
            log::warn!("transcript write failed: {}", e);
        }
    }

    for (_, (_, mut writer)) in open_files.drain() {
        let _ = writer.flush();
    }
}

fn write_entry(open_files: &mut OpenFiles, dir: &Path, entry: &TranscriptEntry) -> Result<(), String> {
    let day = entry
        .created_at
        .with_timezone(&Local)
        .format("%Y-%m-%d")
        .to_string();
    let conversation = sanitize_filename(&entry.conversation);
    let conversation_dir = dir.join(&conversation);

    // At most one file per conversation stays open; a new day closes the old one
    if open_files
        .get(&conversation)
        .is_some_and(|(open_day, _)| *open_day != day)
    {
        if let Some((_, mut previous)) = open_files.remove(&conversation) {
            let _ = previous.flush();
        }
    }

    let (_, writer) = match open_files.entry(conversation) {
        std::collections::hash_map::Entry::Occupied(slot) => slot.into_mut(),
        std::collections::hash_map::Entry::Vacant(slot) => {
            fs::create_dir_all(&conversation_dir)
                .map_err(|e| format!("Failed to create conversation directory: {}", e))?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(conversation_dir.join(format!("{day}.log")))
                .map_err(|e| format!("Failed to open transcript: {}", e))?;
            slot.insert((day, BufWriter::new(file)))
        }
    };

    writeln!(writer, "{}", format_line(entry))
        .and_then(|_| writer.flush())
        .map_err(|e| format!("Failed to write transcript: {}", e))
}

/// `[HH:MM:SS] <author> body`, or `[HH:MM:SS] * body` for system events.
/// Continuation lines of multi-line bodies are indented.
fn format_line(entry: &TranscriptEntry) -> String {
    let ts = entry.created_at.with_timezone(&Local).format("%H:%M:%S");
    let body = entry.body.replace('\n', "\n    ");
    match entry.kind {
        MessageKind::System => format!("[{}] * {}", ts, body),
        _ => format!("[{}] <{}> {}", ts, entry.author, body),
    }
}

fn transcript_directory() -> Result<PathBuf, String> {
    let base = directories::BaseDirs::new().ok_or("Failed to determine home directory")?;
    Ok(base.data_dir().join("ichat-client").join("transcripts"))
}

/// Make a conversation id safe to use as a directory name
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            _ => c,
        })
        .collect();
    match cleaned.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}
