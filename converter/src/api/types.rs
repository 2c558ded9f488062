//! REST API types.
//!
//! `records` carries the converted rows as real JSON (not a string), keys in
//! header order.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{ConvertError, PipelineError, ServerError};
use crate::models::RowMismatch;
use crate::transform::pipeline::{Conversion, Preview};

/// Response sent after a successful conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    /// Unique conversion identifier
    pub conversion_id: String,

    /// "ready", or "warning" when some rows did not match the header width
    pub status: String,

    /// Converted rows
    pub records: Value,

    pub metadata: ConversionMetadata,
}

/// Metadata about the conversion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionMetadata {
    pub encoding: Option<String>,
    pub delimiter: String,
    pub columns: Vec<String>,
    pub row_count: usize,
    pub warnings: Vec<RowMismatch>,
}

/// Response for the preview endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub delimiter: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total_rows: usize,
}

impl TryFrom<Conversion> for ConvertResponse {
    type Error = ConvertError;

    fn try_from(conversion: Conversion) -> Result<Self, Self::Error> {
        let records: Value = serde_json::from_str(&conversion.json)?;
        let status = if conversion.mismatches.is_empty() { "ready" } else { "warning" };

        Ok(ConvertResponse {
            conversion_id: Uuid::new_v4().to_string(),
            status: status.to_string(),
            records,
            metadata: ConversionMetadata {
                encoding: conversion.encoding,
                delimiter: conversion.delimiter.as_char().to_string(),
                columns: conversion.headers,
                row_count: conversion.row_count,
                warnings: conversion.mismatches,
            },
        })
    }
}

impl From<Preview> for PreviewResponse {
    fn from(preview: Preview) -> Self {
        PreviewResponse {
            delimiter: preview.delimiter.as_char().to_string(),
            columns: preview.headers,
            rows: preview.rows,
            total_rows: preview.total_rows,
        }
    }
}

impl ServerError {
    /// HTTP status for this error.
    ///
    /// Nothing-to-convert and bad parameters are client errors (400); data that
    /// cannot be converted is 422.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Pipeline(PipelineError::Convert(ConvertError::EmptyDocument)) => {
                StatusCode::BAD_REQUEST
            }
            ServerError::Pipeline(PipelineError::Convert(ConvertError::Serialization(_))) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServerError::Pipeline(PipelineError::Convert(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Pipeline(PipelineError::Io(_)) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "conversionId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "records": [],
    })
}
