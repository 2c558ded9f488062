//! HTTP server for the csvjson API.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                              |
//! |--------|-------------------|------------------------------------------|
//! | GET    | `/health`         | Health check                             |
//! | POST   | `/api/convert`    | Convert a raw CSV body                   |
//! | POST   | `/api/upload`     | Convert a multipart `file` upload        |
//! | POST   | `/api/preview`    | Parsed header and first rows of a body   |
//! | GET    | `/api/logs`       | SSE stream for real-time logs            |
//!
//! `/api/convert` and `/api/preview` accept `delimiter` (`,` `;` `tab` `|`)
//! as a query parameter; `/api/convert` also takes `indent`, `/api/preview`
//! takes `rows`.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde::Deserialize;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_info, LOG_BROADCASTER};
use super::types::{error_response, ConvertResponse, PreviewResponse};
use crate::config::{Settings, DEFAULT_PREVIEW_ROWS, MAX_INDENT};
use crate::error::{ServerError, ServerResult};
use crate::models::Delimiter;
use crate::parser::decode_auto;
use crate::transform::pipeline::{convert_bytes, preview, ConvertOptions};

type ApiError = (StatusCode, Json<Value>);

/// Shared handler state
#[derive(Debug, Clone)]
pub struct AppState {
    pub settings: Settings,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }
}

/// Query parameters for `/api/convert`
#[derive(Debug, Default, Deserialize)]
pub struct ConvertQuery {
    pub delimiter: Option<String>,
    pub indent: Option<usize>,
}

/// Query parameters for `/api/preview`
#[derive(Debug, Default, Deserialize)]
pub struct PreviewQuery {
    pub delimiter: Option<String>,
    pub rows: Option<usize>,
}

/// Build the application router
pub fn router(settings: Settings) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    let body_limit = settings.max_upload_bytes;

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/convert", post(convert_text))
        .route("/api/upload", post(upload_csv))
        .route("/api/preview", post(preview_text))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(AppState::new(settings))
}

/// Start the HTTP server
pub async fn start_server(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let port = settings.port;
    let app = router(settings);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    eprintln!("🚀 csvjson server running on http://localhost:{}", port);
    eprintln!("   POST /api/convert - Convert raw CSV body");
    eprintln!("   POST /api/upload  - Upload CSV file");
    eprintln!("   POST /api/preview - Preview parsed rows");
    eprintln!("   GET  /api/logs    - SSE log stream");
    eprintln!("   GET  /health      - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "csvjson",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "convert": "POST /api/convert",
            "upload": "POST /api/upload",
            "preview": "POST /api/preview",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Convert a raw CSV request body
pub async fn convert_text(
    State(state): State<AppState>,
    Query(query): Query<ConvertQuery>,
    body: Bytes,
) -> Result<Json<ConvertResponse>, ApiError> {
    let options = convert_options(query.delimiter.as_deref(), query.indent, &state.settings)
        .map_err(api_error)?;
    run_conversion(&body, &options).map(Json).map_err(api_error)
}

/// Upload CSV endpoint
///
/// Expects a `file` part; an optional `delimiter` text part overrides detection.
pub async fn upload_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ConvertResponse>, ApiError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut delimiter: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        api_error(ServerError::BadRequest(format!("Multipart error: {}", e)))
    })? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                file_name = field.file_name().map(|s| s.to_string());
                let bytes = field.bytes().await.map_err(|e| {
                    api_error(ServerError::BadRequest(format!("Read error: {}", e)))
                })?;
                file_data = Some(bytes.to_vec());
            }
            "delimiter" => {
                let text = field.text().await.map_err(|e| {
                    api_error(ServerError::BadRequest(format!("Read error: {}", e)))
                })?;
                delimiter = Some(text);
            }
            _ => {}
        }
    }

    let bytes = file_data
        .ok_or_else(|| api_error(ServerError::BadRequest("No file provided".to_string())))?;

    log_info(format!(
        "📄 Upload: {} ({} bytes)",
        file_name.as_deref().unwrap_or("unknown"),
        bytes.len()
    ));

    let options = convert_options(delimiter.as_deref(), None, &state.settings).map_err(api_error)?;
    run_conversion(&bytes, &options).map(Json).map_err(api_error)
}

/// Preview a raw CSV request body
pub async fn preview_text(
    State(state): State<AppState>,
    Query(query): Query<PreviewQuery>,
    body: Bytes,
) -> Result<Json<PreviewResponse>, ApiError> {
    let options = convert_options(query.delimiter.as_deref(), None, &state.settings)
        .map_err(api_error)?;
    let (content, _encoding) = decode_auto(&body);
    let rows = query.rows.unwrap_or(DEFAULT_PREVIEW_ROWS);

    preview(&content, &options, rows)
        .map(|p| Json(PreviewResponse::from(p)))
        .map_err(|e| api_error(e.into()))
}

fn convert_options(
    delimiter: Option<&str>,
    indent: Option<usize>,
    settings: &Settings,
) -> ServerResult<ConvertOptions> {
    let delimiter = match delimiter.map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => Some(
            d.parse::<Delimiter>()
                .map_err(|e| ServerError::BadRequest(e.to_string()))?,
        ),
        None => None,
    };

    let indent = indent.unwrap_or(settings.indent);
    if indent > MAX_INDENT {
        return Err(ServerError::BadRequest(format!(
            "indent must be at most {}, got {}",
            MAX_INDENT, indent
        )));
    }

    Ok(ConvertOptions { delimiter, indent })
}

fn run_conversion(bytes: &[u8], options: &ConvertOptions) -> ServerResult<ConvertResponse> {
    let conversion = convert_bytes(bytes, options)?;
    Ok(ConvertResponse::try_from(conversion)?)
}

fn api_error(err: ServerError) -> ApiError {
    log_error(err.to_string());
    (err.status_code(), Json(error_response(&err.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> State<AppState> {
        State(AppState::new(Settings::default()))
    }

    #[tokio::test]
    async fn test_health() {
        let Json(value) = health().await;
        assert_eq!(value["status"], "ok");
        assert_eq!(value["service"], "csvjson");
    }

    #[tokio::test]
    async fn test_convert_text() {
        let body = Bytes::from_static(b"a;b\n1;2\n3\n");
        let Json(response) = convert_text(state(), Query(ConvertQuery::default()), body)
            .await
            .unwrap();

        assert_eq!(response.status, "warning");
        assert_eq!(response.metadata.delimiter, ";");
        assert_eq!(response.metadata.columns, vec!["a", "b"]);
        assert_eq!(response.metadata.row_count, 2);
        assert_eq!(response.records[1]["b"], "");
        assert_eq!(response.metadata.warnings[0].line, 3);
    }

    #[tokio::test]
    async fn test_convert_text_explicit_delimiter() {
        let query = ConvertQuery {
            delimiter: Some("tab".into()),
            indent: Some(2),
        };
        let body = Bytes::from_static(b"a\tb\n1\t2\n");
        let Json(response) = convert_text(state(), Query(query), body).await.unwrap();

        assert_eq!(response.status, "ready");
        assert_eq!(response.records[0]["a"], "1");
    }

    #[tokio::test]
    async fn test_convert_text_empty_body() {
        let (status, Json(value)) =
            convert_text(state(), Query(ConvertQuery::default()), Bytes::new())
                .await
                .unwrap_err();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["status"], "error");
    }

    #[tokio::test]
    async fn test_convert_text_malformed() {
        let body = Bytes::from_static(b"a,b\n\"1,2\n");
        let (status, Json(value)) = convert_text(state(), Query(ConvertQuery::default()), body)
            .await
            .unwrap_err();

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(value["error"].as_str().unwrap().contains("Malformed"));
    }

    #[tokio::test]
    async fn test_convert_text_bad_delimiter() {
        let query = ConvertQuery {
            delimiter: Some("#".into()),
            indent: None,
        };
        let (status, _) = convert_text(state(), Query(query), Bytes::from_static(b"a#b"))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_convert_text_indent_too_large() {
        for indent in [MAX_INDENT + 1, usize::MAX] {
            let query = ConvertQuery {
                delimiter: None,
                indent: Some(indent),
            };
            let (status, Json(value)) =
                convert_text(state(), Query(query), Bytes::from_static(b"a,b\n1,2\n"))
                    .await
                    .unwrap_err();
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(value["error"].as_str().unwrap().contains("indent"));
        }

        let query = ConvertQuery {
            delimiter: None,
            indent: Some(MAX_INDENT),
        };
        let body = Bytes::from_static(b"a,b\n1,2\n");
        assert!(convert_text(state(), Query(query), body).await.is_ok());
    }

    #[tokio::test]
    async fn test_preview_text() {
        let query = PreviewQuery {
            delimiter: None,
            rows: Some(1),
        };
        let body = Bytes::from_static(b"x,y\n1,2\n3,4\n");
        let Json(response) = preview_text(state(), Query(query), body).await.unwrap();

        assert_eq!(response.delimiter, ",");
        assert_eq!(response.rows, vec![vec!["1", "2"]]);
        assert_eq!(response.total_rows, 2);
    }

    #[test]
    fn test_router_builds() {
        let _app = router(Settings::default());
    }
}
