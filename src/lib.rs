//! ichat client library.
//!
//! This module re-exports the core components for testing and extension.

pub mod app;
pub mod backend;
pub mod buffer;
pub mod config;
pub mod error;
pub mod events;
pub mod input_state;
pub mod list;
pub mod message;
pub mod protocol;
pub mod state;
pub mod transcript;
pub mod ui;
pub mod validation;

#[cfg(test)]
mod backend_tests;
