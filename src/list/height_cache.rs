//! Measured row heights keyed by message id.

use std::collections::{HashMap, HashSet};

use crate::error::MeasurementError;

/// Height used for rows that have not been measured yet.
pub const DEFAULT_ROW_HEIGHT: f32 = 100.0;

/// Per-message height ledger.
///
/// Unmeasured ids resolve to a fixed estimate so offset math always has a
/// finite, positive value to work with.
#[derive(Debug, Clone)]
pub struct HeightCache {
    heights: HashMap<String, f32>,
    default_height: f32,
    dirty: bool,
}

impl Default for HeightCache {
    fn default() -> Self {
        Self::new(DEFAULT_ROW_HEIGHT)
    }
}

impl HeightCache {
    /// Create a cache with the given estimate. Invalid estimates fall back to
    /// [`DEFAULT_ROW_HEIGHT`].
    pub fn new(default_height: f32) -> Self {
        let default_height = if default_height.is_finite() && default_height > 0.0 {
            default_height
        } else {
            DEFAULT_ROW_HEIGHT
        };
        Self {
            heights: HashMap::new(),
            default_height,
            dirty: false,
        }
    }

    pub fn default_height(&self) -> f32 {
        self.default_height
    }

    pub fn get(&self, id: &str) -> f32 {
        self.heights.get(id).copied().unwrap_or(self.default_height)
    }

    /// Record a measurement.
    ///
    /// Returns `Ok(true)` when the stored value changed, `Ok(false)` when it
    /// was already equal. Rejected writes leave the previous value in place.
    pub fn set(&mut self, id: &str, height: f32) -> Result<bool, MeasurementError> {
        if id.is_empty() {
            return Err(MeasurementError::EmptyId);
        }
        if !height.is_finite() || height <= 0.0 {
            return Err(MeasurementError::InvalidHeight {
                id: id.to_string(),
                height,
            });
        }

        match self.heights.get_mut(id) {
            Some(existing) if *existing == height => Ok(false),
            Some(existing) => {
                *existing = height;
                self.dirty = true;
                Ok(true)
            }
            None => {
                self.heights.insert(id.to_string(), height);
                self.dirty = true;
                Ok(true)
            }
        }
    }

    /// Drop entries whose id is not in `live_ids`. Returns how many were removed.
    pub fn prune(&mut self, live_ids: &HashSet<&str>) -> usize {
        let before = self.heights.len();
        self.heights.retain(|id, _| live_ids.contains(id.as_str()));
        before - self.heights.len()
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Read and clear the dirty flag: whether any stored height changed
    /// since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_id_returns_default() {
        let cache = HeightCache::default();
        assert_eq!(cache.get("never-set"), DEFAULT_ROW_HEIGHT);
        assert!(!cache.get("never-set").is_nan());

        let custom = HeightCache::new(42.0);
        assert_eq!(custom.get("x"), 42.0);
    }

    #[test]
    fn test_invalid_default_falls_back() {
        assert_eq!(HeightCache::new(0.0).default_height(), DEFAULT_ROW_HEIGHT);
        assert_eq!(HeightCache::new(f32::NAN).default_height(), DEFAULT_ROW_HEIGHT);
        assert_eq!(HeightCache::new(-5.0).default_height(), DEFAULT_ROW_HEIGHT);
    }

    #[test]
    fn test_set_same_height_is_idempotent() {
        let mut cache = HeightCache::default();
        assert_eq!(cache.set("a", 48.0), Ok(true));
        assert!(cache.take_dirty());

        // Second identical write must not dirty the cache
        assert_eq!(cache.set("a", 48.0), Ok(false));
        assert!(!cache.take_dirty());

        assert_eq!(cache.set("a", 52.0), Ok(true));
        assert!(cache.take_dirty());
        assert_eq!(cache.get("a"), 52.0);
    }

    #[test]
    fn test_rejects_invalid_measurements() {
        let mut cache = HeightCache::default();
        cache.set("a", 30.0).unwrap();
        cache.take_dirty();

        for bad in [0.0, -1.0, f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            assert!(matches!(
                cache.set("a", bad),
                Err(MeasurementError::InvalidHeight { .. })
            ));
        }
        assert_eq!(cache.get("a"), 30.0);
        assert!(!cache.take_dirty());

        assert_eq!(cache.set("", 10.0), Err(MeasurementError::EmptyId));
        // Rejected write on an unmeasured id keeps the default estimate
        assert!(cache.set("b", f32::NAN).is_err());
        assert_eq!(cache.get("b"), DEFAULT_ROW_HEIGHT);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_prune_removes_dead_ids() {
        let mut cache = HeightCache::default();
        cache.set("a", 10.0).unwrap();
        cache.set("b", 20.0).unwrap();
        cache.set("c", 30.0).unwrap();

        let live: HashSet<&str> = ["a", "c"].into_iter().collect();
        assert_eq!(cache.prune(&live), 1);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("b"), DEFAULT_ROW_HEIGHT);
        assert_eq!(cache.get("c"), 30.0);
    }
}
