//! Segment partitioning
//!
//! Resolves an arbitrary, possibly overlapping set of span labels into an
//! ordered, non-overlapping cover of `[0, content_len)`. Each emitted segment
//! carries the names of the labels covering it, so a render adapter only ever
//! deals in disjoint slices.
//!
//! The sweep collects every interval boundary plus `0` and `content_len`,
//! then classifies each gap between adjacent boundaries by the labels
//! covering its midpoint. Correct for any overlap pattern: containment,
//! partial overlap, and touching intervals.

use std::collections::{BTreeSet, HashSet};

use super::index::RangeError;
use super::types::{Segment, SpanLabel};

/// Partition a block's content into render segments.
///
/// Every interval is validated against `content_len` first; an out-of-bounds
/// interval is a data error, not something to clamp. `content_len == 0`
/// yields no segments.
pub fn partition(content_len: usize, labels: &[SpanLabel]) -> Result<Vec<Segment>, RangeError> {
    for label in labels {
        if label.start >= label.end {
            return Err(RangeError::Inverted {
                start: label.start,
                end: label.end,
            });
        }
        if label.end > content_len {
            return Err(RangeError::OutOfBounds {
                end: label.end,
                len: content_len,
            });
        }
    }

    if content_len == 0 {
        return Ok(Vec::new());
    }

    let mut boundaries: HashSet<usize> = HashSet::with_capacity(labels.len() * 2 + 2);
    boundaries.insert(0);
    boundaries.insert(content_len);
    for label in labels {
        boundaries.insert(label.start);
        boundaries.insert(label.end);
    }

    let mut points: Vec<usize> = boundaries.into_iter().collect();
    points.sort_unstable();

    let mut segments = Vec::with_capacity(points.len() - 1);
    for pair in points.windows(2) {
        let (p, q) = (pair[0], pair[1]);
        let mid = (p + q) / 2;
        let covering: BTreeSet<String> = labels
            .iter()
            .filter(|l| l.contains(mid))
            .map(|l| l.name.clone())
            .collect();
        segments.push(Segment {
            start: p,
            end: q,
            covering,
        });
    }

    Ok(segments)
}

/// Slice a string by character offsets.
///
/// Logical offsets throughout the engine count characters, so render adapters
/// working with `&str` need this rather than byte slicing.
pub fn char_slice(content: &str, start: usize, end: usize) -> &str {
    let mut indices = content
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(content.len()));
    let byte_start = indices.by_ref().nth(start).unwrap_or(content.len());
    let byte_end = if end > start {
        indices.nth(end - start - 1).unwrap_or(content.len())
    } else {
        byte_start
    };
    &content[byte_start..byte_end]
}
