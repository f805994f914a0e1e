use serde::{Deserialize, Serialize};
use directories::ProjectDirs;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::list::auto_scroll::DEFAULT_BOTTOM_THRESHOLD;
use crate::list::{ListOptions, DEFAULT_ROW_HEIGHT};
use crate::validation::validate_display_name;

// Default configuration
pub const DEFAULT_USER_ID: &str = "me";
pub const DEFAULT_DISPLAY_NAME: &str = "Me";
/// Composer history entries kept on disk
pub const MAX_HISTORY: usize = 100;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Settings {
    // Identity
    pub user_id: String,
    pub display_name: String,
    /// "dark" or "light"
    pub theme: String,

    // List tuning
    pub default_row_height: f32,
    pub overscan: f32,
    pub root_margin: f32,
    pub bottom_threshold: f32,

    // Paging
    pub page_size: usize,

    // Backend simulation
    pub latency_ms: u64,
    pub auto_reply: bool,
    pub reply_delay_ms: u64,
    pub fail_first_history_fetch: bool,

    /// Write conversation transcripts to disk
    pub transcripts: bool,

    /// Composer history, oldest first
    pub history: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        let list = ListOptions::default();
        Self {
            user_id: DEFAULT_USER_ID.to_string(),
            display_name: DEFAULT_DISPLAY_NAME.to_string(),
            theme: "dark".to_string(),
            default_row_height: DEFAULT_ROW_HEIGHT,
            overscan: list.overscan,
            root_margin: list.root_margin,
            bottom_threshold: DEFAULT_BOTTOM_THRESHOLD,
            page_size: crate::backend::DEFAULT_PAGE_SIZE,
            latency_ms: 250,
            auto_reply: true,
            reply_delay_ms: 1500,
            fail_first_history_fetch: false,
            transcripts: false,
            history: Vec::new(),
        }
    }
}

impl Settings {
    pub fn list_options(&self) -> ListOptions {
        ListOptions {
            default_row_height: self.default_row_height,
            overscan: self.overscan,
            root_margin: self.root_margin,
        }
    }

    /// Append a composer entry, keeping the newest [`MAX_HISTORY`].
    pub fn remember(&mut self, entry: &str) {
        if entry.trim().is_empty() || self.history.last().is_some_and(|last| last == entry) {
            return;
        }
        self.history.push(entry.to_string());
        if self.history.len() > MAX_HISTORY {
            let excess = self.history.len() - MAX_HISTORY;
            self.history.drain(0..excess);
        }
    }
}

pub fn settings_path() -> Option<PathBuf> {
    if let Some(proj) = ProjectDirs::from("com", "ichat", "ichat-client") {
        let dir = proj.config_dir();
        if let Err(e) = fs::create_dir_all(dir) {
            log::warn!("Failed to create config dir: {}", e);
            return None;
        }
        return Some(dir.join("settings.json"));
    }
    None
}

pub fn load_settings() -> Option<Settings> {
    load_settings_from(&settings_path()?)
}

pub fn load_settings_from(path: &Path) -> Option<Settings> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str::<Settings>(&content) {
        Ok(mut settings) => {
            if let Err(e) = validate_display_name(&settings.display_name) {
                log::warn!("{e}; using the default display name");
                settings.display_name = DEFAULT_DISPLAY_NAME.to_string();
            }
            Some(settings)
        }
        Err(e) => {
            log::warn!("Ignoring unreadable settings at {}: {}", path.display(), e);
            None
        }
    }
}

pub fn save_settings(settings: &Settings) -> std::io::Result<()> {
    if let Some(path) = settings_path() {
        save_settings_to(&path, settings)?;
    }
    Ok(())
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> std::io::Result<()> {
    let data = serde_json::to_string_pretty(settings)?;
    let mut file = fs::File::create(path)?;
    file.write_all(data.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut settings = Settings::default();
        settings.display_name = "Ada".into();
        settings.overscan = 320.0;
        settings.remember("hello");
        save_settings_to(&path, &settings).unwrap();

        assert_eq!(load_settings_from(&path), Some(settings));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"display_name":"Ada","page_size":20}"#).unwrap();

        let settings = load_settings_from(&path).unwrap();
        assert_eq!(settings.display_name, "Ada");
        assert_eq!(settings.page_size, 20);
        assert_eq!(settings.user_id, DEFAULT_USER_ID);
        assert_eq!(settings.default_row_height, DEFAULT_ROW_HEIGHT);
        assert!(settings.auto_reply);
    }

    #[test]
    fn test_invalid_or_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        assert!(load_settings_from(&path).is_none());
        fs::write(&path, "{not json").unwrap();
        assert!(load_settings_from(&path).is_none());
    }

    #[test]
    fn test_blank_display_name_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"display_name":"   "}"#).unwrap();
        assert_eq!(load_settings_from(&path).unwrap().display_name, DEFAULT_DISPLAY_NAME);
    }

    #[test]
    fn test_remember_bounds_history() {
        let mut settings = Settings::default();
        for i in 0..(MAX_HISTORY + 5) {
            settings.remember(&format!("line {i}"));
        }
        settings.remember("line 104");
        settings.remember("   ");
        assert_eq!(settings.history.len(), MAX_HISTORY);
        assert_eq!(settings.history[0], "line 5");
    }
}
