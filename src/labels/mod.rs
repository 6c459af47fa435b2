//! Span and classification labels
//!
//! The interval side of the engine: label types, the per-block span index,
//! and the partitioner that turns overlapping spans into disjoint render
//! segments.

pub mod index;
pub mod partition;
pub mod types;

pub use index::{RangeError, SpanIntervalIndex};
pub use partition::{char_slice, partition};
pub use types::{
    ClassificationLabel, LabelDefinition, LabelKind, LabelScope, Segment, SpanLabel,
};
