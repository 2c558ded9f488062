//! # csvjson - CSV to JSON conversion
//!
//! Turns CSV text into a pretty-printed JSON array, one object per data row,
//! keyed by the header row. Every value stays a JSON string.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV bytes  │────▶│  Delimiter  │────▶│   Records   │────▶│ JSON array  │
//! │  (ISO/UTF8) │     │  (; then ,) │     │  (quoted)   │     │ (4 spaces)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use csvjson::convert_csv_to_json;
//!
//! let json = convert_csv_to_json("a,b\n1,2\n").unwrap();
//! let value: serde_json::Value = serde_json::from_str(&json).unwrap();
//! assert_eq!(value[0]["b"], "2");
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`models`] - Delimiter, Record, Header, JsonObject
//! - [`parser`] - Delimiter detection, CSV reading, byte decoding
//! - [`transform`] - Projection, serialization and the conversion pipeline
//! - [`config`] - Defaults and environment settings
//! - [`api`] - HTTP API server and log broadcaster

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Conversion
pub mod transform;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{
    ConvertError, ConvertResult, PipelineError, PipelineResult, ServerError, ServerResult,
};

pub use models::{Delimiter, Header, JsonObject, Record, RowMismatch};

pub use parser::{
    decode_auto, decode_content, detect_delimiter, detect_encoding, parse_csv, RecordReader,
};

pub use transform::{
    convert, convert_bytes, convert_csv_to_json, convert_file, preview, preview_default, project,
    project_with_report, serialize, serialize_with_indent, Conversion, ConvertOptions, Preview,
    Projection,
};

pub use config::Settings;

// Server
pub mod server {
    pub use crate::api::server::{router, start_server};
}
