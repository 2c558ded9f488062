//! Pretty JSON rendering of converted rows.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::config::{DEFAULT_INDENT, MAX_INDENT};
use crate::error::{ConvertError, ConvertResult};
use crate::models::JsonObject;

/// Render objects as a JSON array indented with four spaces.
///
/// An empty slice renders as `[]`.
pub fn serialize(objects: &[JsonObject]) -> ConvertResult<String> {
    serialize_with_indent(objects, DEFAULT_INDENT)
}

/// Render objects as a JSON array with `indent` spaces per level.
///
/// `indent` may not exceed [`MAX_INDENT`].
pub fn serialize_with_indent(objects: &[JsonObject], indent: usize) -> ConvertResult<String> {
    if indent > MAX_INDENT {
        return Err(ConvertError::Serialization(format!(
            "indent of {} exceeds the maximum of {}",
            indent, MAX_INDENT
        )));
    }
    let indent = " ".repeat(indent);
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(indent.as_bytes()));
    objects.serialize(&mut ser)?;

    String::from_utf8(buf).map_err(|e| ConvertError::Serialization(e.to_string()))
}
