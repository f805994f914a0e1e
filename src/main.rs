//! ichat - a chat client with a virtualized message list, built with egui
//!
//! Architecture:
//! - Main thread: runs the egui UI
//! - Backend thread: runs a Tokio runtime around the message store
//! - Communication via crossbeam channels (lock-free, sync-safe)

use eframe::egui;
use ichat_client::app::ChatApp;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 700.0])
            .with_min_inner_size([480.0, 360.0]),
        ..Default::default()
    };

    eframe::run_native(
        "ichat",
        options,
        Box::new(|cc| Ok(Box::new(ChatApp::new(cc)))),
    )
}
