//! Transformation module.
//!
//! - Projector: records to JSON objects keyed by the header
//! - Serializer: JSON objects to pretty text
//! - Pipeline: detection, parsing, projection and serialization in one call

pub mod pipeline;
pub mod projector;
pub mod serializer;

pub use pipeline::*;
pub use projector::{log_mismatches, project, project_with_report, Projection};
pub use serializer::{serialize, serialize_with_indent};
