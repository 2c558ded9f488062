//! Domain models for the CSV to JSON conversion pipeline.
//!
//! - [`Delimiter`] - Field separator, chosen once per document
//! - [`Record`] - One parsed CSV row with its source line
//! - [`Header`] - Validated first record, source of every JSON key
//! - [`JsonObject`] - One converted row, keys in header order
//! - [`RowMismatch`] - A data row whose width differs from the header

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{ConvertError, ConvertResult};

// =============================================================================
// Delimiter
// =============================================================================

/// Field separator of a CSV document.
///
/// Auto-detection only yields [`Delimiter::Semicolon`] or [`Delimiter::Comma`];
/// the other variants are available as explicit overrides.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    Comma,
    Semicolon,
    Tab,
    Pipe,
}

impl Delimiter {
    /// Character this delimiter splits on.
    pub fn as_char(self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Semicolon => ';',
            Delimiter::Tab => '\t',
            Delimiter::Pipe => '|',
        }
    }

    /// Parse a delimiter from its character.
    pub fn from_char(c: char) -> ConvertResult<Self> {
        match c {
            ',' => Ok(Delimiter::Comma),
            ';' => Ok(Delimiter::Semicolon),
            '\t' => Ok(Delimiter::Tab),
            '|' => Ok(Delimiter::Pipe),
            other => Err(ConvertError::UnsupportedDelimiter(other)),
        }
    }

    /// Printable form (`\t` for tab).
    pub fn display_name(self) -> &'static str {
        match self {
            Delimiter::Comma => ",",
            Delimiter::Semicolon => ";",
            Delimiter::Tab => "\\t",
            Delimiter::Pipe => "|",
        }
    }
}

impl TryFrom<char> for Delimiter {
    type Error = ConvertError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Delimiter::from_char(c)
    }
}

impl std::str::FromStr for Delimiter {
    type Err = ConvertError;

    /// Accepts the character itself, `\t`, or a name (`comma`, `semicolon`, `tab`, `pipe`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "comma" => Ok(Delimiter::Comma),
            "semicolon" => Ok(Delimiter::Semicolon),
            "tab" | "\\t" => Ok(Delimiter::Tab),
            "pipe" => Ok(Delimiter::Pipe),
            _ => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Delimiter::from_char(c),
                    _ => Err(ConvertError::UnsupportedDelimiter(s.chars().next().unwrap_or(' '))),
                }
            }
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// =============================================================================
// Record
// =============================================================================

/// One parsed CSV row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Field values, trimmed outside quotes.
    pub fields: Vec<String>,
    /// 1-based line on which the record starts.
    pub line: usize,
}

impl Record {
    pub fn new(fields: Vec<String>, line: usize) -> Self {
        Self { fields, line }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// Fields joined back with the delimiter, for previews.
    pub fn join(&self, delimiter: Delimiter) -> String {
        let sep = delimiter.as_char().to_string();
        self.fields.join(sep.as_str())
    }
}

// =============================================================================
// Header
// =============================================================================

/// The first record of a document, validated as a list of field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    names: Vec<String>,
}

impl Header {
    /// Validate a record as a header.
    ///
    /// Names are trimmed and must be non-empty; case is kept as written.
    ///
    /// Names must also be unique ignoring case. A repeated key would make the
    /// later column overwrite the earlier one in every JSON object, losing data
    /// without notice, so such a header fails with
    /// [`ConvertError::DuplicateHeader`] instead of converting.
    pub fn from_record(record: Record) -> ConvertResult<Self> {
        let mut header = Self {
            names: Vec::with_capacity(record.fields.len()),
        };

        for (i, name) in record.fields.into_iter().enumerate() {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(ConvertError::InvalidHeader { column: i + 1 });
            }
            if header.position(&name).is_some() {
                return Err(ConvertError::DuplicateHeader { name });
            }
            header.names.push(name);
        }

        Ok(header)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Case-insensitive column lookup.
    pub fn position(&self, name: &str) -> Option<usize> {
        let wanted = name.trim().to_lowercase();
        self.names.iter().position(|n| n.to_lowercase() == wanted)
    }

    pub fn into_names(self) -> Vec<String> {
        self.names
    }
}

// =============================================================================
// JSON output
// =============================================================================

/// One converted row. Insertion order is header order (`preserve_order`).
pub type JsonObject = Map<String, Value>;

/// A data row whose field count differs from the header's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowMismatch {
    /// 1-based source line of the row.
    pub line: usize,
    /// Header width.
    pub expected: usize,
    /// Row width.
    pub found: usize,
}

impl RowMismatch {
    /// Values were dropped (row too long) rather than padded.
    pub fn is_truncated(&self) -> bool {
        self.found > self.expected
    }
}

impl fmt::Display for RowMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_truncated() {
            write!(
                f,
                "Line {}: {} fields for {} columns, {} extra value(s) dropped",
                self.line,
                self.found,
                self.expected,
                self.found - self.expected
            )
        } else {
            write!(
                f,
                "Line {}: {} fields for {} columns, {} missing value(s) set to \"\"",
                self.line,
                self.found,
                self.expected,
                self.expected - self.found
            )
        }
    }
}
