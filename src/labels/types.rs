//! Core label types
//!
//! Label definitions come from the project configuration and are immutable
//! after load. Span labels carry character intervals into a block's content;
//! classification labels attach to a whole document, page, or block.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// What a label definition attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelScope {
    Document,
    Page,
    Block,
}

/// The behavior of a label definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelKind {
    /// Radio-button classification: one active value per target.
    #[serde(rename = "classification_single")]
    ClassificationSingle,
    /// Checkbox classification: any number active per target.
    #[serde(rename = "classification_multiple")]
    ClassificationMultiple,
    /// Free-span text label over a character interval.
    #[serde(rename = "text")]
    Text,
}

impl LabelKind {
    /// Whether this kind attaches to a whole target (no offsets).
    pub fn is_classification(self) -> bool {
        matches!(
            self,
            LabelKind::ClassificationSingle | LabelKind::ClassificationMultiple
        )
    }

    /// Whether activating this kind displaces other exclusive labels.
    pub fn is_exclusive(self) -> bool {
        matches!(self, LabelKind::ClassificationSingle)
    }

    /// Whether this kind labels a character interval.
    pub fn is_span(self) -> bool {
        matches!(self, LabelKind::Text)
    }
}

/// A named label kind from the project configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelDefinition {
    /// Unique label name, referenced by annotations.
    pub name: String,
    /// Display color as a hex string.
    pub color: String,
    /// Label behavior.
    #[serde(rename = "type")]
    pub kind: LabelKind,
    /// What the label attaches to.
    #[serde(rename = "target")]
    pub scope: LabelScope,
}

/// A named annotation over a character interval `[start, end)` of one block.
///
/// Offsets count characters, not bytes. `start < end <= content length` is
/// enforced at insertion by the interval index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanLabel {
    /// Unique id within the owning block.
    pub id: String,
    /// Referenced label definition name.
    pub name: String,
    /// Start character offset (inclusive).
    pub start: usize,
    /// End character offset (exclusive).
    pub end: usize,
}

impl SpanLabel {
    /// Create a span label with a fresh id.
    pub fn new(name: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            start,
            end,
        }
    }

    /// Create a span label with a caller-supplied id (loaded from storage).
    pub fn with_id(
        id: impl Into<String>,
        name: impl Into<String>,
        start: usize,
        end: usize,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            start,
            end,
        }
    }

    /// Whether the interval contains the given character offset.
    pub fn contains(&self, point: usize) -> bool {
        self.start <= point && point < self.end
    }

    /// Interval length in characters.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the interval is empty (never true for a validated label).
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// A named annotation attached to a whole document, page, or block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationLabel {
    /// Referenced label definition name.
    pub name: String,
}

impl ClassificationLabel {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A derived, non-overlapping slice of a block's content with the names of
/// the span labels covering it. Ephemeral render output, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Start character offset (inclusive).
    pub start: usize,
    /// End character offset (exclusive).
    pub end: usize,
    /// Names of span labels covering this slice, in sorted order.
    pub covering: BTreeSet<String>,
}

impl Segment {
    /// Whether no label covers this slice.
    pub fn is_plain(&self) -> bool {
        self.covering.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_predicates() {
        assert!(LabelKind::ClassificationSingle.is_classification());
        assert!(LabelKind::ClassificationSingle.is_exclusive());
        assert!(LabelKind::ClassificationMultiple.is_classification());
        assert!(!LabelKind::ClassificationMultiple.is_exclusive());
        assert!(LabelKind::Text.is_span());
        assert!(!LabelKind::Text.is_classification());
    }

    #[test]
    fn test_kind_wire_names() {
        let json = serde_json::to_string(&LabelKind::ClassificationSingle).unwrap();
        assert_eq!(json, "\"classification_single\"");
        let parsed: LabelKind = serde_json::from_str("\"text\"").unwrap();
        assert_eq!(parsed, LabelKind::Text);
    }

    #[test]
    fn test_definition_wire_fields() {
        let def: LabelDefinition = serde_json::from_str(
            r##"{"name": "severity", "color": "#ff0000", "type": "classification_multiple", "target": "page"}"##,
        )
        .unwrap();
        assert_eq!(def.kind, LabelKind::ClassificationMultiple);
        assert_eq!(def.scope, LabelScope::Page);
    }

    #[test]
    fn test_span_label_contains() {
        let label = SpanLabel::with_id("a", "term", 2, 5);
        assert!(!label.contains(1));
        assert!(label.contains(2));
        assert!(label.contains(4));
        assert!(!label.contains(5));
        assert_eq!(label.len(), 3);
    }

    #[test]
    fn test_fresh_ids_are_unique() {
        let a = SpanLabel::new("term", 0, 1);
        let b = SpanLabel::new("term", 0, 1);
        assert_ne!(a.id, b.id);
    }
}
