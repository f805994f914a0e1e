//! Prefix-sum offset table with lazy invalidation.

use super::height_cache::HeightCache;

/// Cumulative row offsets: `offsets[i]` is the top of row `i` and
/// `offsets[len]` is the total content height.
///
/// Only the first `valid` entries are trusted. Reads go through
/// [`OffsetTable::refresh`] first, which rebuilds the stale suffix.
#[derive(Debug, Clone)]
pub struct OffsetTable {
    offsets: Vec<f32>,
    valid: usize,
}

impl Default for OffsetTable {
    fn default() -> Self {
        Self {
            offsets: vec![0.0],
            valid: 1,
        }
    }
}

impl OffsetTable {
    /// Mark every offset after row `index` as stale. `offset(index)` itself
    /// only depends on earlier rows and stays valid.
    pub fn invalidate_from(&mut self, index: usize) {
        self.valid = self.valid.min(index + 1).max(1);
    }

    pub fn is_fresh(&self, len: usize) -> bool {
        self.offsets.len() == len + 1 && self.valid == len + 1
    }

    /// Rebuild stale offsets for `ids`. Returns the number of rows recomputed.
    pub fn refresh(&mut self, ids: &[String], cache: &HeightCache) -> usize {
        let len = ids.len();
        if self.offsets.len() != len + 1 {
            self.offsets.resize(len + 1, 0.0);
            self.valid = self.valid.min(len + 1);
        }
        let start = self.valid - 1;
        for i in start..len {
            self.offsets[i + 1] = self.offsets[i] + cache.get(&ids[i]);
        }
        self.valid = len + 1;
        len - start
    }

    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn offset(&self, index: usize) -> f32 {
        debug_assert!(index < self.valid, "read of stale offset {index}");
        self.offsets[index.min(self.offsets.len() - 1)]
    }

    pub fn height(&self, index: usize) -> f32 {
        self.offset(index + 1) - self.offset(index)
    }

    pub fn total(&self) -> f32 {
        self.offset(self.len())
    }

    /// First row whose bottom edge lies below `y`.
    pub fn first_ending_after(&self, y: f32) -> usize {
        self.offsets[1..].partition_point(|&bottom| bottom <= y)
    }

    /// Number of rows whose top edge is at or above `y`.
    pub fn count_starting_at_or_before(&self, y: f32) -> usize {
        self.offsets[..self.len()].partition_point(|&top| top <= y)
    }
}
