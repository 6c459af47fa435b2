//! Page region overlays
//!
//! Normalized rectangular highlight regions over rendered page images, keyed
//! by block id. Regions route clicks back to blocks via hit-testing, and are
//! handed to render adapters with a small deliberate inflation so adjacent
//! highlights do not leave a seam along a shared border.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance for float drift when validating that a region stays on the page.
const EDGE_TOLERANCE: f64 = 1e-9;

/// A region whose coordinates leave the normalized page. Caller error,
/// rejected at construction.
#[derive(Debug, Error, PartialEq)]
pub enum RegionError {
    #[error("Region coordinate {name} = {value} is outside [0, 1]")]
    CoordinateOutOfRange { name: &'static str, value: f64 },

    #[error("Region extends past the page edge: right {right}, bottom {bottom}")]
    PastPageEdge { right: f64, bottom: f64 },
}

/// A normalized rectangle over a page image, origin top-left, all values in
/// `[0, 1]` relative to the page dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Region {
    /// Create a validated region.
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Result<Self, RegionError> {
        for (name, value) in [
            ("left", left),
            ("top", top),
            ("width", width),
            ("height", height),
        ] {
            if !(0.0..=1.0).contains(&value) || !value.is_finite() {
                return Err(RegionError::CoordinateOutOfRange { name, value });
            }
        }
        let (right, bottom) = (left + width, top + height);
        if right > 1.0 + EDGE_TOLERANCE || bottom > 1.0 + EDGE_TOLERANCE {
            return Err(RegionError::PastPageEdge { right, bottom });
        }
        Ok(Self {
            left,
            top,
            width,
            height,
        })
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Whether a normalized point falls inside the region.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right() && y >= self.top && y <= self.bottom()
    }

    /// Whether two regions overlap.
    pub fn intersects(&self, other: &Region) -> bool {
        self.left < other.right()
            && self.right() > other.left
            && self.top < other.bottom()
            && self.bottom() > other.top
    }

    /// Grow each edge outward by `epsilon`, clamped back onto the page.
    ///
    /// Adjacent regions drawn edge-to-edge can leave a hairline seam on some
    /// rendering surfaces; drawing the slightly inflated rect closes it.
    pub fn inflated(&self, epsilon: f64) -> Region {
        let left = (self.left - epsilon).max(0.0);
        let top = (self.top - epsilon).max(0.0);
        let right = (self.right() + epsilon).min(1.0);
        let bottom = (self.bottom() + epsilon).min(1.0);
        Region {
            left,
            top,
            width: right - left,
            height: bottom - top,
        }
    }
}

/// Render tuning for region overlays.
///
/// The seam inflation default suits typical screen densities; the right value
/// depends on the rendering surface, so it is configuration rather than a
/// constant (see [`crate::config`] for the environment override).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayConfig {
    /// Per-edge inflation applied when drawing adjacent regions.
    pub seam_inflation: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            seam_inflation: 0.001,
        }
    }
}

/// Per-page store of block highlight regions.
#[derive(Debug, Clone, Default)]
pub struct RegionOverlayIndex {
    pages: HashMap<u32, Vec<(String, Region)>>,
}

impl RegionOverlayIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a block's region on a page, replacing any previous one.
    pub fn put(&mut self, page: u32, block_id: impl Into<String>, region: Region) {
        let block_id = block_id.into();
        let entries = self.pages.entry(page).or_default();
        entries.retain(|(id, _)| *id != block_id);
        entries.push((block_id, region));
    }

    /// The stored region for a block, if any.
    pub fn get(&self, page: u32, block_id: &str) -> Option<&Region> {
        self.pages
            .get(&page)?
            .iter()
            .find(|(id, _)| id == block_id)
            .map(|(_, r)| r)
    }

    /// Remove a block's region. No-op when absent.
    pub fn remove(&mut self, page: u32, block_id: &str) {
        if let Some(entries) = self.pages.get_mut(&page) {
            entries.retain(|(id, _)| id != block_id);
        }
    }

    /// Route a click on a page to the block whose region contains it.
    ///
    /// With overlapping regions the most recently stored one wins, matching
    /// paint order.
    pub fn hit_test(&self, page: u32, x: f64, y: f64) -> Option<&str> {
        self.pages
            .get(&page)?
            .iter()
            .rev()
            .find(|(_, region)| region.contains(x, y))
            .map(|(id, _)| id.as_str())
    }

    /// All regions on a page in storage order.
    pub fn page_regions(&self, page: u32) -> impl Iterator<Item = (&str, &Region)> {
        self.pages
            .get(&page)
            .into_iter()
            .flat_map(|entries| entries.iter().map(|(id, r)| (id.as_str(), r)))
    }

    /// Regions on a page ready for drawing: seam inflation applied.
    pub fn render_regions(&self, page: u32, config: &OverlayConfig) -> Vec<(String, Region)> {
        self.page_regions(page)
            .map(|(id, r)| (id.to_string(), r.inflated(config.seam_inflation)))
            .collect()
    }

    /// Drop every region on every page.
    pub fn clear(&mut self) {
        self.pages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(left: f64, top: f64, width: f64, height: f64) -> Region {
        Region::new(left, top, width, height).unwrap()
    }

    #[test]
    fn test_rejects_out_of_range_coordinates() {
        assert!(matches!(
            Region::new(-0.1, 0.0, 0.5, 0.5),
            Err(RegionError::CoordinateOutOfRange { name: "left", .. })
        ));
        assert!(matches!(
            Region::new(0.0, 0.0, 1.5, 0.5),
            Err(RegionError::CoordinateOutOfRange { name: "width", .. })
        ));
        assert!(matches!(
            Region::new(0.8, 0.0, 0.5, 0.5),
            Err(RegionError::PastPageEdge { .. })
        ));
    }

    #[test]
    fn test_contains_and_intersects() {
        let r = region(0.25, 0.25, 0.5, 0.5);
        assert!(r.contains(0.5, 0.5));
        assert!(r.contains(0.25, 0.25));
        assert!(!r.contains(0.1, 0.5));

        let other = region(0.5, 0.5, 0.4, 0.4);
        assert!(r.intersects(&other));
        let apart = region(0.8, 0.8, 0.1, 0.1);
        assert!(!r.intersects(&apart));
    }

    #[test]
    fn test_hit_test_routes_to_block() {
        let mut index = RegionOverlayIndex::new();
        index.put(1, "7", region(0.1, 0.1, 0.3, 0.2));
        index.put(1, "8", region(0.6, 0.6, 0.3, 0.2));

        assert_eq!(index.hit_test(1, 0.2, 0.2), Some("7"));
        assert_eq!(index.hit_test(1, 0.7, 0.7), Some("8"));
        assert_eq!(index.hit_test(1, 0.5, 0.5), None);
        assert_eq!(index.hit_test(2, 0.2, 0.2), None);
    }

    #[test]
    fn test_hit_test_prefers_most_recent() {
        let mut index = RegionOverlayIndex::new();
        index.put(1, "a", region(0.0, 0.0, 0.5, 0.5));
        index.put(1, "b", region(0.0, 0.0, 0.5, 0.5));
        assert_eq!(index.hit_test(1, 0.25, 0.25), Some("b"));
    }

    #[test]
    fn test_put_replaces_existing() {
        let mut index = RegionOverlayIndex::new();
        index.put(1, "7", region(0.1, 0.1, 0.2, 0.2));
        index.put(1, "7", region(0.5, 0.5, 0.2, 0.2));
        assert_eq!(index.page_regions(1).count(), 1);
        assert!(index.get(1, "7").unwrap().contains(0.6, 0.6));
    }

    #[test]
    fn test_inflation_closes_seams_and_clamps() {
        let config = OverlayConfig::default();
        let left = region(0.0, 0.0, 0.5, 1.0);
        let right = region(0.5, 0.0, 0.5, 1.0);

        // Edge-to-edge neighbors overlap once inflated: no seam.
        let left_inflated = left.inflated(config.seam_inflation);
        let right_inflated = right.inflated(config.seam_inflation);
        assert!(left_inflated.right() > right_inflated.left);

        // Inflation never leaves the page.
        assert_eq!(left_inflated.left, 0.0);
        assert_eq!(right_inflated.right(), 1.0);
    }

    #[test]
    fn test_render_regions_apply_inflation() {
        let mut index = RegionOverlayIndex::new();
        index.put(1, "7", region(0.2, 0.2, 0.4, 0.4));
        let config = OverlayConfig {
            seam_inflation: 0.01,
        };
        let rendered = index.render_regions(1, &config);
        assert_eq!(rendered.len(), 1);
        let (_, r) = &rendered[0];
        assert!((r.left - 0.19).abs() < 1e-12);
        assert!((r.right() - 0.61).abs() < 1e-12);
    }
}
