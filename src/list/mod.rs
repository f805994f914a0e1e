//! Virtualized message list core.
//!
//! - `height_cache`: measured row heights with a default estimate
//! - `offsets`: prefix-sum offset table rebuilt lazily after invalidation
//! - `virtual_list`: viewport windowing, scroll-to-index, load-more sentinel
//! - `auto_scroll`: stick-to-bottom and anchor-preserving decisions
//! - `grouping` / `row`: per-row display flags and view-models
//!
//! [`MessageList`] ties these together for one mounted conversation. It is
//! UI-agnostic: the widget layer reports the viewport and measured heights,
//! and applies the scroll requests it hands back.

pub mod auto_scroll;
pub mod grouping;
pub mod height_cache;
pub mod offsets;
pub mod row;
pub mod sentinel;
pub mod virtual_list;

pub use auto_scroll::{AutoScrollController, Mutation, ScrollAnchor, ScrollCommand};
pub use grouping::{flags_at, row_flags, RowFlags};
pub use height_cache::{HeightCache, DEFAULT_ROW_HEIGHT};
pub use row::{build_row, RowCommon, RowModel};
pub use virtual_list::{
    ListOptions, ScrollAlign, ViewportPin, ViewportWindow, VirtualList, VisibleRow,
};

use crate::message::Message;

/// Scroll positions closer than this are treated as equal.
const SCROLL_EPSILON: f32 = 0.5;

/// List state for the conversation currently on screen.
#[derive(Debug, Clone)]
pub struct MessageList {
    list: VirtualList,
    controller: AutoScrollController,
    revision: Option<u64>,
    /// Request handed to the widget and not yet confirmed by a viewport report
    in_flight: Option<f32>,
}

impl MessageList {
    pub fn new(current_user: impl Into<String>, options: ListOptions, bottom_threshold: f32) -> Self {
        Self {
            list: VirtualList::new(options),
            controller: AutoScrollController::new(current_user, bottom_threshold),
            revision: None,
            in_flight: None,
        }
    }

    /// Adopt a new message array and apply the resulting scroll decision.
    pub fn sync(&mut self, messages: &[Message]) -> Mutation {
        let mutation = self.controller.classify(messages);
        let previous_total = self.list.total_height();
        let pin = (self.controller.anchor() == ScrollAnchor::ScrolledUp)
            .then(|| self.list.pin_viewport());

        self.list.sync(messages.iter().map(|m| m.id.clone()).collect());
        self.controller.record(messages);

        match self.controller.on_mutation(mutation, previous_total) {
            ScrollCommand::ScrollToBottom => {
                self.list.scroll_to_bottom();
            }
            ScrollCommand::PreserveAnchor { previous_total } => {
                let delta = self.list.total_height() - previous_total;
                if delta != 0.0 {
                    self.list.scroll_by(delta);
                }
            }
            ScrollCommand::Keep => {
                // Rows removed or inserted above the viewport must not move it
                if let Some(pin) = &pin {
                    self.list.restore_pin(pin);
                }
            }
        }
        log::trace!("list sync: {mutation:?}, anchor {:?}", self.controller.anchor());
        mutation
    }

    /// [`MessageList::sync`] only when the buffer revision moved.
    pub fn sync_if_changed(&mut self, revision: u64, messages: &[Message]) -> Option<Mutation> {
        if self.revision == Some(revision) {
            return None;
        }
        self.revision = Some(revision);
        Some(self.sync(messages))
    }

    /// Report the widget's scroll position and visible height.
    ///
    /// A position that differs from the list's own is a user scroll and
    /// updates the anchor. While anchored to the bottom the list keeps
    /// following content growth from late measurements.
    pub fn update_viewport(&mut self, scroll_top: f32, viewport_height: f32) {
        self.list.set_viewport_height(viewport_height);
        if let Some(target) = self.in_flight.take() {
            if (scroll_top - target).abs() > SCROLL_EPSILON {
                // Widget clamped against last frame's content size; ask again
                self.list.scroll_by(0.0);
                return;
            }
        }
        if (scroll_top - self.list.scroll_top()).abs() > SCROLL_EPSILON {
            self.list.set_scroll_top(scroll_top);
            let content = self.list.total_height();
            self.controller
                .on_scroll(self.list.scroll_top(), self.list.viewport_height(), content);
        }
        // Also pulls back a position left past the end by shrinking rows
        if self.controller.anchor() == ScrollAnchor::AtBottom {
            let max = self.list.max_scroll();
            if (self.list.scroll_top() - max).abs() > SCROLL_EPSILON {
                self.list.scroll_to_bottom();
            }
        }
    }

    pub fn measure(&mut self, id: &str, height: f32) -> bool {
        self.list.measure(id, height)
    }

    pub fn window(&mut self) -> ViewportWindow {
        self.list.window()
    }

    /// Scroll position the widget should apply this frame.
    pub fn take_scroll_request(&mut self) -> Option<f32> {
        let request = self.list.take_scroll_request();
        if request.is_some() {
            self.in_flight = request;
        }
        request
    }

    /// A scroll position is waiting for the next frame.
    pub fn has_scroll_request(&self) -> bool {
        self.list.has_scroll_request()
    }

    /// Whether older history should be requested now.
    pub fn poll_load_more(&mut self, has_more: bool, is_loading: bool) -> bool {
        self.list.poll_sentinel(has_more, is_loading)
    }

    pub fn load_failed(&mut self, reason: impl Into<String>) {
        self.list.sentinel_mut().fail(reason);
    }

    pub fn load_failure(&self) -> Option<&str> {
        self.list.sentinel().failure()
    }

    /// Manual retry after a failed load. Returns whether to request now.
    pub fn retry_load(&mut self, has_more: bool, is_loading: bool) -> bool {
        self.list.sentinel_mut().retry(has_more, is_loading)
    }

    pub fn clear_load_failure(&mut self) {
        self.list.sentinel_mut().clear_failure();
    }

    pub fn anchor(&self) -> ScrollAnchor {
        self.controller.anchor()
    }

    pub fn scroll_to_bottom(&mut self) {
        self.list.scroll_to_bottom();
        let content = self.list.total_height();
        self.controller
            .on_scroll(self.list.scroll_top(), self.list.viewport_height(), content);
    }

    pub fn scroll_to_message(&mut self, id: &str, align: ScrollAlign) -> bool {
        let Some(index) = self.list.index_of(id) else {
            return false;
        };
        self.list.scroll_to_index(index, align);
        let content = self.list.total_height();
        self.controller
            .on_scroll(self.list.scroll_top(), self.list.viewport_height(), content);
        true
    }

    pub fn list(&self) -> &VirtualList {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut VirtualList {
        &mut self.list
    }
}
