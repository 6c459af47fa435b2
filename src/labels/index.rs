//! Per-block span label store
//!
//! Holds the character-interval labels of one text block and validates
//! intervals against the block's content length at insertion. Overlapping
//! spans of the same name are kept as distinct entries; deduplication is a
//! caller policy, not an index behavior.

use thiserror::Error;

use super::types::SpanLabel;

/// A span interval that violates block bounds. Rejected at insertion, never
/// silently clamped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("Span interval is inverted or empty: start {start} >= end {end}")]
    Inverted { start: usize, end: usize },

    #[error("Span end {end} exceeds content length {len}")]
    OutOfBounds { end: usize, len: usize },
}

/// Interval store for one block's span labels.
#[derive(Debug, Clone, Default)]
pub struct SpanIntervalIndex {
    content_len: usize,
    labels: Vec<SpanLabel>,
}

impl SpanIntervalIndex {
    /// Create an index for a block whose content is `content_len` characters.
    pub fn new(content_len: usize) -> Self {
        Self {
            content_len,
            labels: Vec::new(),
        }
    }

    /// The content length this index validates against.
    pub fn content_len(&self) -> usize {
        self.content_len
    }

    /// Validate an interval against the block bounds without inserting.
    pub fn check_bounds(&self, start: usize, end: usize) -> Result<(), RangeError> {
        if start >= end {
            return Err(RangeError::Inverted { start, end });
        }
        if end > self.content_len {
            return Err(RangeError::OutOfBounds {
                end,
                len: self.content_len,
            });
        }
        Ok(())
    }

    /// Add a span label, rejecting out-of-bounds intervals.
    pub fn insert(&mut self, label: SpanLabel) -> Result<(), RangeError> {
        self.check_bounds(label.start, label.end)?;
        self.labels.push(label);
        Ok(())
    }

    /// Remove a label by id. No-op when the id is absent.
    pub fn remove(&mut self, id: &str) {
        self.labels.retain(|l| l.id != id);
    }

    /// Labels whose interval contains the given character offset.
    pub fn query(&self, point: usize) -> Vec<&SpanLabel> {
        self.labels.iter().filter(|l| l.contains(point)).collect()
    }

    /// Look up a label by id.
    pub fn get(&self, id: &str) -> Option<&SpanLabel> {
        self.labels.iter().find(|l| l.id == id)
    }

    /// Whether an identical (name, interval) label is already present.
    pub fn contains_duplicate(&self, name: &str, start: usize, end: usize) -> bool {
        self.labels
            .iter()
            .any(|l| l.name == name && l.start == start && l.end == end)
    }

    /// All labels in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &SpanLabel> {
        self.labels.iter()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Drop all labels and adopt a new content length. Used when a block's
    /// text is edited: edits are destructive to span labels.
    pub fn reset(&mut self, content_len: usize) {
        self.labels.clear();
        self.content_len = content_len;
    }
}
