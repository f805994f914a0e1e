/// Backend submodules for the message store and action handling
///
/// - `store`: the `MessageStore` seam and the in-memory fixture store
/// - `handlers`: per-action work run in spawned tasks
/// - `main_loop`: runtime setup and the action polling loop
mod handlers;
mod main_loop;
pub mod store;

// Re-export the main backend entry points
pub use main_loop::{run_backend, BackendOptions};
pub use store::{MemoryStore, MessageStore, PageRequest, DEFAULT_PAGE_SIZE};
