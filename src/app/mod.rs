//! Application module structure for ChatApp
//!
//! This module organizes the main application into focused submodules:
//! - `core`: ChatApp struct, backend spawning and shutdown
//! - `events`: Event processing from backend
//! - `update`: Main update loop and global shortcuts
//! - `ui::panels`: Menu bar, header and central message panel
//! - `ui::input`: Composer with reply / edit modes and history

pub mod core;
pub mod events;
pub mod ui;
pub mod update;

// Re-export ChatApp for public API
pub use core::ChatApp;
