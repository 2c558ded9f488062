//! High-level conversion API.
//!
//! Combines all steps: delimiter detection, parsing, projection and
//! serialization.
//!
//! # Example
//!
//! ```
//! use csvjson::convert_csv_to_json;
//!
//! let json = convert_csv_to_json("a;b\n1;2\n").unwrap();
//! assert_eq!(json, "[\n    {\n        \"a\": \"1\",\n        \"b\": \"2\"\n    }\n]");
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::projector::{log_mismatches, project_with_report};
use super::serializer::serialize_with_indent;
use crate::api::logs::{log_info, log_success};
use crate::config::{DEFAULT_INDENT, DEFAULT_PREVIEW_ROWS};
use crate::error::{ConvertError, ConvertResult, PipelineResult};
use crate::models::{Delimiter, Header, Record, RowMismatch};
use crate::parser::{decode_auto, detect_delimiter, parse_csv};

/// Options for a conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertOptions {
    /// Explicit delimiter; auto-detected when `None`.
    pub delimiter: Option<Delimiter>,

    /// Spaces per indentation level in the JSON output.
    pub indent: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            indent: DEFAULT_INDENT,
        }
    }
}

/// Result of a conversion.
#[derive(Debug, Clone, Serialize)]
pub struct Conversion {
    /// Pretty-printed JSON array.
    pub json: String,
    /// Delimiter used (detected or explicit).
    pub delimiter: Delimiter,
    /// Column names, in order.
    pub headers: Vec<String>,
    /// Number of data rows converted.
    pub row_count: usize,
    /// Rows whose width differed from the header.
    pub mismatches: Vec<RowMismatch>,
    /// Encoding of the source bytes, when converted from bytes or a file.
    pub encoding: Option<String>,
}

/// First rows of a document as parsed.
#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    pub delimiter: Delimiter,
    pub headers: Vec<String>,
    /// Parsed data rows, at most `max_rows`.
    pub rows: Vec<Vec<String>>,
    /// Each row re-joined with the delimiter, header first.
    pub lines: Vec<String>,
    /// Total number of data rows in the document.
    pub total_rows: usize,
}

/// Convert CSV text to pretty-printed JSON with default options.
pub fn convert_csv_to_json(content: &str) -> ConvertResult<String> {
    convert(content, &ConvertOptions::default()).map(|c| c.json)
}

/// Convert CSV text to JSON.
///
/// Error precedence: blank text is [`ConvertError::EmptyDocument`], then
/// delimiter detection, then parsing, then header validation.
pub fn convert(content: &str, options: &ConvertOptions) -> ConvertResult<Conversion> {
    let (delimiter, header, data) = split_document(content, options)?;

    log_success(format!("Separator: '{}'", delimiter));
    log_info(format!("{} columns, {} rows", header.len(), data.len()));

    let projection = project_with_report(&header, &data);
    log_mismatches(&projection.mismatches);

    let json = serialize_with_indent(&projection.objects, options.indent)?;

    Ok(Conversion {
        json,
        delimiter,
        row_count: projection.objects.len(),
        headers: header.into_names(),
        mismatches: projection.mismatches,
        encoding: None,
    })
}

/// Parse the first `max_rows` data rows for display.
pub fn preview(content: &str, options: &ConvertOptions, max_rows: usize) -> ConvertResult<Preview> {
    let (delimiter, header, data) = split_document(content, options)?;

    let shown = &data[..max_rows.min(data.len())];
    let mut lines = Vec::with_capacity(shown.len() + 1);
    lines.push(Record::new(header.names().to_vec(), 1).join(delimiter));
    lines.extend(shown.iter().map(|r| r.join(delimiter)));

    Ok(Preview {
        delimiter,
        headers: header.into_names(),
        rows: shown.iter().map(|r| r.fields.clone()).collect(),
        lines,
        total_rows: data.len(),
    })
}

/// Preview with the default row count.
pub fn preview_default(content: &str) -> ConvertResult<Preview> {
    preview(content, &ConvertOptions::default(), DEFAULT_PREVIEW_ROWS)
}

/// Decode raw bytes (encoding auto-detected) and convert.
pub fn convert_bytes(bytes: &[u8], options: &ConvertOptions) -> PipelineResult<Conversion> {
    let (content, encoding) = decode_auto(bytes);
    log_success(format!("Detected encoding: {}", encoding));

    let mut conversion = convert(&content, options)?;
    conversion.encoding = Some(encoding);
    Ok(conversion)
}

/// Read a file and convert it.
pub fn convert_file<P: AsRef<Path>>(path: P, options: &ConvertOptions) -> PipelineResult<Conversion> {
    log_info(format!("Reading {}", path.as_ref().display()));
    let bytes = std::fs::read(path.as_ref())?;
    convert_bytes(&bytes, options)
}

/// Resolve the delimiter, parse, and split off the validated header.
fn split_document(
    content: &str,
    options: &ConvertOptions,
) -> ConvertResult<(Delimiter, Header, Vec<Record>)> {
    if content.trim().is_empty() {
        return Err(ConvertError::EmptyDocument);
    }

    let delimiter = match options.delimiter {
        Some(d) => d,
        None => detect_delimiter(content)?,
    };

    let mut records = parse_csv(content, delimiter)?.into_iter();
    let header = records.next().ok_or(ConvertError::EmptyDocument)?;
    let header = Header::from_record(header)?;

    Ok((delimiter, header, records.collect()))
}
