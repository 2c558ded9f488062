//! CSV parsing with delimiter and encoding auto-detection.
//!
//! - [`delimiter`] - whole-document delimiter detection
//! - [`reader`] - quote-aware record reader
//! - [`encoding`] - byte decoding for file and upload input
//!
//! Nothing here knows about JSON; see [`crate::transform`] for that.

pub mod delimiter;
pub mod encoding;
pub mod reader;

pub use delimiter::detect_delimiter;
pub use encoding::{decode_auto, decode_content, detect_encoding};
pub use reader::{parse_csv, RecordReader};
