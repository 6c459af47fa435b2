//! Persisted document schema
//!
//! Serde types mirroring the document and label-definition payloads exactly
//! as the backing service emits them. These types are the wire format only;
//! semantic validation (span bounds, known label names, region coordinates)
//! happens when the controller loads a payload into engine state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::labels::{ClassificationLabel, LabelDefinition, RangeError};
use crate::regions::{Region, RegionError};

/// Completion status carried by the document, each page, and each block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelStatus {
    Open,
    Done,
}

impl LabelStatus {
    pub fn is_done(self) -> bool {
        matches!(self, LabelStatus::Done)
    }

    /// The opposite status, for done-toggle actions.
    pub fn toggled(self) -> Self {
        match self {
            LabelStatus::Open => LabelStatus::Done,
            LabelStatus::Done => LabelStatus::Open,
        }
    }
}

impl Default for LabelStatus {
    fn default() -> Self {
        LabelStatus::Open
    }
}

/// A malformed document or definitions payload. Raised during load, before
/// any engine state is touched.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Malformed payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Label '{name}' references no definition")]
    UnknownLabel { name: String },

    #[error("Label '{name}' is not usable here: expected {expected}")]
    WrongKind { name: String, expected: &'static str },

    #[error("Duplicate label definition '{name}'")]
    DuplicateDefinition { name: String },

    #[error("Definition '{name}' has unparseable color '{color}'")]
    InvalidColor { name: String, color: String },

    #[error("Duplicate block id '{id}'")]
    DuplicateBlockId { id: String },

    #[error("Duplicate span label id '{id}' in block '{block}'")]
    DuplicateSpanId { block: String, id: String },

    #[error("Invalid span label in block '{block}'")]
    InvalidSpan {
        block: String,
        #[source]
        source: RangeError,
    },

    #[error("Invalid region for block '{block}'")]
    InvalidRegion {
        block: String,
        #[source]
        source: RegionError,
    },
}

/// Top-level document payload: `{ "data": { ... } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPayload {
    pub data: DocumentData,
}

/// The document body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentData {
    pub label_status: LabelStatus,
    /// Document-level classification labels.
    pub labels: Vec<ClassificationLabel>,
    pub pages: Vec<PageData>,
}

/// One page of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageData {
    /// Page number, as assigned by the backing service.
    pub page: u32,
    pub label_status: LabelStatus,
    /// Page-level classification labels.
    pub labels: Vec<ClassificationLabel>,
    pub blocks: Vec<BlockData>,
}

/// One text block with its highlight region and labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockData {
    pub id: String,
    pub content: String,
    pub label_status: LabelStatus,
    /// Normalized highlight rect over the page image. Coordinate validation
    /// happens at load, not at parse.
    pub position: Region,
    pub labels: Vec<BlockLabelEntry>,
}

/// A block label entry: span labels carry offsets, classification labels are
/// a bare name. The two shapes share one array on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockLabelEntry {
    Span {
        id: String,
        name: String,
        start: usize,
        end: usize,
    },
    Classification {
        name: String,
    },
}

/// Project payload: `{ "label_definitions": [ ... ] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionsPayload {
    pub label_definitions: Vec<LabelDefinition>,
}

/// Parse a document payload from JSON.
pub fn parse_document(json: &str) -> Result<DocumentPayload, SchemaError> {
    Ok(serde_json::from_str(json)?)
}

/// Parse a label-definitions payload from JSON.
pub fn parse_definitions(json: &str) -> Result<DefinitionsPayload, SchemaError> {
    Ok(serde_json::from_str(json)?)
}
