//! Event processing from backend

use super::ChatApp;
use crate::events;

impl ChatApp {
    /// Drain backend events into the client state and forward the
    /// follow-up actions they produce (initial history of the first
    /// conversation, for instance).
    pub fn process_events(&mut self) {
        for action in events::process_events(&self.event_rx, &mut self.state) {
            self.send(action);
        }
    }
}
