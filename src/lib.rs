//! Pagemark
//!
//! A span/region annotation engine for page-structured documents. Users
//! attach classification labels and free-span text labels to pages, blocks,
//! and character ranges, plus rectangular highlight regions over rendered
//! page images; the engine resolves overlapping spans into disjoint render
//! segments with blended colors and maps visual selections to logical
//! offsets and back.
//!
//! The public surface is pure data — segments, colors, regions, offsets — so
//! any rendering adapter (web, terminal, native) can consume it. Transport
//! and user notification are capabilities injected at construction.
//!
//! # Modules
//!
//! - `labels`: span/classification label types, the per-block interval
//!   index, and the segment partitioner
//! - `color`: color blending and WCAG contrast selection
//! - `selection`: rendered-node tree and selection ↔ offset mapping
//! - `regions`: normalized page regions with hit-testing and seam handling
//! - `schema`: persisted document and label-definition wire types
//! - `registry`: immutable label-definition catalog
//! - `controller`: the annotation state machine and the async session
//! - `transport`: abstract fetch/submit capability with an HTTP impl
//! - `notify`: user notification capability
//! - `config`: environment-driven render tuning

pub mod color;
pub mod config;
pub mod controller;
pub mod error;
pub mod labels;
pub mod notify;
pub mod regions;
pub mod registry;
pub mod schema;
pub mod selection;
pub mod transport;

pub use controller::session::{AnnotationSession, SessionError};
pub use controller::{
    AnnotationController, BlockMode, ControllerError, LabelTarget, Progress, RenderSegment,
};
pub use error::{EngineError, Result};
pub use labels::{
    ClassificationLabel, LabelDefinition, LabelKind, LabelScope, RangeError, Segment,
    SpanIntervalIndex, SpanLabel,
};
pub use notify::{Notifier, Severity, TracingNotifier};
pub use regions::{OverlayConfig, Region, RegionError, RegionOverlayIndex};
pub use registry::LabelDefinitionRegistry;
pub use schema::{DocumentPayload, LabelStatus, SchemaError};
pub use selection::{NodePosition, RenderNode, SelectionError, SelectionOffsets};
pub use transport::{DocumentStore, HttpStore, NetworkError};
