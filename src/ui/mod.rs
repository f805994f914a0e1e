//! UI rendering modules for the chat client.
//!
//! This module contains the egui widgets, organized by component:
//! - `sidebar`: Conversation list with unread badges
//! - `messages`: Virtualized message panel
//! - `toasts`: Floating status notifications
//! - `theme`: Color schemes and styling utilities

pub mod messages;
pub mod sidebar;
pub mod theme;
pub mod toasts;
