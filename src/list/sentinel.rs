//! Edge-triggered "load more" detection for the top of the list.

/// Tracks whether the first row is near the viewport top and decides when
/// to ask for older history.
///
/// Fires on the transition from not-visible to visible only. Once a load
/// failed the sentinel stays quiet until [`TopSentinel::retry`] or
/// [`TopSentinel::clear_failure`] is called.
#[derive(Debug, Clone, Default)]
pub struct TopSentinel {
    visible: bool,
    failure: Option<String>,
}

impl TopSentinel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the current visibility. Returns `true` when a load should start.
    pub fn observe(&mut self, visible: bool, has_more: bool, is_loading: bool) -> bool {
        let entered = visible && !self.visible;
        self.visible = visible;
        entered && has_more && !is_loading && self.failure.is_none()
    }

    pub fn fail(&mut self, reason: impl Into<String>) {
        self.failure = Some(reason.into());
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn clear_failure(&mut self) {
        self.failure = None;
    }

    /// Manual retry path. Clears a latched failure and returns whether a
    /// load should start now.
    pub fn retry(&mut self, has_more: bool, is_loading: bool) -> bool {
        self.failure = None;
        has_more && !is_loading
    }
}
