//! Viewport windowing over measured rows.

use std::collections::{HashMap, HashSet};

use super::height_cache::{HeightCache, DEFAULT_ROW_HEIGHT};
use super::offsets::OffsetTable;
use super::sentinel::TopSentinel;

/// Tuning knobs for [`VirtualList`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListOptions {
    /// Estimate for rows that have not been measured yet
    pub default_row_height: f32,
    /// Extra pixels rendered above and below the viewport
    pub overscan: f32,
    /// Distance from the top at which the first row counts as visible for
    /// the load-more sentinel
    pub root_margin: f32,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            default_row_height: DEFAULT_ROW_HEIGHT,
            overscan: 200.0,
            root_margin: 48.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAlign {
    Start,
    Center,
    End,
}

/// A row selected for rendering, positioned in content coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleRow {
    pub index: usize,
    pub offset: f32,
    pub height: f32,
}

/// The contiguous range of rows to render for the current scroll position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewportWindow {
    pub start: usize,
    /// Exclusive
    pub end: usize,
    pub rows: Vec<VisibleRow>,
    pub total_height: f32,
}

impl ViewportWindow {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Rows at the top of the viewport with their distance from `scroll_top`,
/// taken before an id change so the view can be put back afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewportPin {
    scroll_top: f32,
    rows: Vec<(String, f32)>,
}

/// Windowed list of rows identified by message id.
///
/// Owns the height cache and the offset table derived from it. Every method
/// that reads offsets refreshes the stale suffix first.
#[derive(Debug, Clone)]
pub struct VirtualList {
    options: ListOptions,
    cache: HeightCache,
    offsets: OffsetTable,
    ids: Vec<String>,
    index_of: HashMap<String, usize>,
    scroll_top: f32,
    viewport_height: f32,
    scroll_request: Option<f32>,
    sentinel: TopSentinel,
}

impl Default for VirtualList {
    fn default() -> Self {
        Self::new(ListOptions::default())
    }
}

fn sanitize(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

impl VirtualList {
    pub fn new(options: ListOptions) -> Self {
        Self {
            cache: HeightCache::new(options.default_row_height),
            options,
            offsets: OffsetTable::default(),
            ids: Vec::new(),
            index_of: HashMap::new(),
            scroll_top: 0.0,
            viewport_height: 0.0,
            scroll_request: None,
            sentinel: TopSentinel::new(),
        }
    }

    pub fn cache(&self) -> &HeightCache {
        &self.cache
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_of.get(id).copied()
    }

    /// Adopt a new ordered id list.
    ///
    /// Offsets are invalidated from the first position where the old and new
    /// lists differ, and heights of ids that disappeared are pruned.
    pub fn sync(&mut self, ids: Vec<String>) {
        let unchanged_prefix = self
            .ids
            .iter()
            .zip(&ids)
            .take_while(|(old, new)| old == new)
            .count();
        if unchanged_prefix == self.ids.len() && unchanged_prefix == ids.len() {
            return;
        }

        self.offsets.invalidate_from(unchanged_prefix);
        self.index_of = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        self.ids = ids;

        let live: HashSet<&str> = self.ids.iter().map(String::as_str).collect();
        let pruned = self.cache.prune(&live);
        if pruned > 0 {
            log::debug!("pruned {pruned} stale row heights");
        }

        self.refresh();
        let max = self.max_scroll();
        if self.scroll_top > max {
            self.scroll_top = max;
        }
    }

    fn refresh(&mut self) {
        if !self.offsets.is_fresh(self.ids.len()) {
            self.offsets.refresh(&self.ids, &self.cache);
        }
    }

    /// Record the measured height of a rendered row.
    ///
    /// Invalid measurements are dropped. When a row that starts above the
    /// viewport changes height, the scroll position moves by the same delta
    /// so the visible rows stay put. Returns whether the layout changed.
    pub fn measure(&mut self, id: &str, height: f32) -> bool {
        let Some(index) = self.index_of(id) else {
            log::debug!("ignoring measurement for unknown row {id}");
            return false;
        };
        self.refresh();
        let top = self.offsets.offset(index);
        let previous = self.cache.get(id);

        if let Err(e) = self.cache.set(id, height) {
            log::debug!("rejected row measurement: {e}");
            return false;
        }
        // Unchanged heights leave the offsets alone
        if !self.cache.take_dirty() {
            return false;
        }
        self.offsets.invalidate_from(index);
        if top < self.scroll_top {
            self.scroll_top = sanitize(self.scroll_top + height - previous);
            self.scroll_request = Some(self.scroll_top);
        }
        true
    }

    pub fn scroll_top(&self) -> f32 {
        self.scroll_top
    }

    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    pub fn set_viewport_height(&mut self, height: f32) {
        self.viewport_height = sanitize(height);
    }

    /// Position reported by the scroll widget. Does not create a request.
    pub fn set_scroll_top(&mut self, scroll_top: f32) {
        self.scroll_top = sanitize(scroll_top);
    }

    pub fn total_height(&mut self) -> f32 {
        self.refresh();
        self.offsets.total()
    }

    pub fn max_scroll(&mut self) -> f32 {
        (self.total_height() - self.viewport_height).max(0.0)
    }

    pub fn offset_of(&mut self, index: usize) -> Option<f32> {
        if index >= self.ids.len() {
            return None;
        }
        self.refresh();
        Some(self.offsets.offset(index))
    }

    /// Remember which rows are on screen and where.
    pub fn pin_viewport(&mut self) -> ViewportPin {
        self.refresh();
        let start = self.offsets.first_ending_after(self.scroll_top);
        let end = self
            .offsets
            .count_starting_at_or_before(self.scroll_top + self.viewport_height)
            .max(start);
        ViewportPin {
            scroll_top: self.scroll_top,
            rows: (start..end)
                .map(|i| (self.ids[i].clone(), self.scroll_top - self.offsets.offset(i)))
                .collect(),
        }
    }

    /// Scroll so the first pinned row that still exists sits where it was.
    ///
    /// Rows inserted or removed above the viewport otherwise shift the
    /// visible content. Returns `false` when none of the pinned rows survived.
    pub fn restore_pin(&mut self, pin: &ViewportPin) -> bool {
        let Some((index, distance)) = pin
            .rows
            .iter()
            .find_map(|(id, distance)| Some((self.index_of(id)?, *distance)))
        else {
            return false;
        };
        self.refresh();
        let target = self.offsets.offset(index) + distance;
        // The widget still sits at the pinned position
        if (target - pin.scroll_top).abs() > f32::EPSILON
            || (target - self.scroll_top).abs() > f32::EPSILON
        {
            self.request_scroll(target);
        }
        true
    }

    /// Rows intersecting the viewport widened by the overscan.
    pub fn window(&mut self) -> ViewportWindow {
        self.refresh();
        let total_height = self.offsets.total();
        if self.ids.is_empty() || self.viewport_height <= 0.0 {
            return ViewportWindow {
                total_height,
                ..Default::default()
            };
        }

        let top = self.scroll_top - self.options.overscan;
        let bottom = self.scroll_top + self.viewport_height + self.options.overscan;
        let start = self.offsets.first_ending_after(top);
        let end = self.offsets.count_starting_at_or_before(bottom).max(start);

        let rows = (start..end)
            .map(|index| VisibleRow {
                index,
                offset: self.offsets.offset(index),
                height: self.offsets.height(index),
            })
            .collect();

        ViewportWindow {
            start,
            end,
            rows,
            total_height,
        }
    }

    fn request_scroll(&mut self, target: f32) -> f32 {
        let target = sanitize(target).min(self.max_scroll());
        self.scroll_top = target;
        self.scroll_request = Some(target);
        target
    }

    /// Scroll so that row `index` is aligned in the viewport. Indices past
    /// the end target the last row. Returns the new scroll position.
    pub fn scroll_to_index(&mut self, index: usize, align: ScrollAlign) -> f32 {
        if self.ids.is_empty() {
            return self.request_scroll(0.0);
        }
        self.refresh();
        let index = index.min(self.ids.len() - 1);
        let top = self.offsets.offset(index);
        let height = self.offsets.height(index);
        let target = match align {
            ScrollAlign::Start => top,
            ScrollAlign::Center => top + height / 2.0 - self.viewport_height / 2.0,
            ScrollAlign::End => top + height - self.viewport_height,
        };
        self.request_scroll(target)
    }

    pub fn scroll_to_bottom(&mut self) -> f32 {
        let max = self.max_scroll();
        self.request_scroll(max)
    }

    pub fn scroll_by(&mut self, delta: f32) -> f32 {
        self.request_scroll(self.scroll_top + delta)
    }

    /// Programmatic scroll position the widget still has to apply.
    pub fn take_scroll_request(&mut self) -> Option<f32> {
        self.scroll_request.take()
    }

    pub fn has_scroll_request(&self) -> bool {
        self.scroll_request.is_some()
    }

    /// Whether the first row is within `root_margin` of the viewport top.
    pub fn sentinel_visible(&self) -> bool {
        !self.ids.is_empty() && self.viewport_height > 0.0 && self.scroll_top <= self.options.root_margin
    }

    /// Returns `true` once per entry of the first row into the viewport when
    /// older history can be requested.
    pub fn poll_sentinel(&mut self, has_more: bool, is_loading: bool) -> bool {
        let visible = self.sentinel_visible();
        self.sentinel.observe(visible, has_more, is_loading)
    }

    pub fn sentinel(&self) -> &TopSentinel {
        &self.sentinel
    }

    pub fn sentinel_mut(&mut self) -> &mut TopSentinel {
        &mut self.sentinel
    }
}
