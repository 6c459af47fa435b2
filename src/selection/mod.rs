//! Selection ↔ offset mapping
//!
//! A presentation adapter reports selections as endpoint positions in its
//! rendered markup; the engine works in logical character offsets. This
//! module owns the abstract rendered-node tree and the mapping both ways.

pub mod mapper;
pub mod node;

pub use mapper::{to_offsets, to_range, ResolvedRange, SelectionError, SelectionOffsets};
pub use node::{NodePosition, RenderNode};
