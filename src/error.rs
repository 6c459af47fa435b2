//! Crate-level error type
//!
//! Each module owns its error enum; this aggregates them for callers that
//! drive the whole engine through one `Result` type. Structural errors
//! (ranges, schema, selection) indicate programmer or data faults and are
//! handled at the call boundary; only network errors are transient.

use thiserror::Error;

use crate::config::ConfigError;
use crate::controller::session::SessionError;
use crate::controller::ControllerError;
use crate::labels::RangeError;
use crate::regions::RegionError;
use crate::schema::SchemaError;
use crate::selection::SelectionError;
use crate::transport::NetworkError;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Any failure the annotation engine can produce.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Range(#[from] RangeError),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Region(#[from] RegionError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Controller(#[from] ControllerError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Page-image decoding failure from the external viewer, passed through
    /// untouched.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
