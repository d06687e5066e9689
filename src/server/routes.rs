//! Route handlers and response types

use super::AppState;
use crate::audio;
use crate::cancel::{CancelOnDrop, CancelToken};
use crate::error::{MixmapError, Result};
use crate::types::Segment;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Multipart field carrying the audio upload
const UPLOAD_FIELD: &str = "file";

// ---- Response types ----

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    #[serde(rename = "Status")]
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct KeyResponse {
    pub filename: String,
    pub detected_key: String,
    pub camelot_code: String,
}

#[derive(Debug, Serialize)]
pub struct StructureResponse {
    pub filename: String,
    pub duration_sec: f64,
    pub mix_points: Vec<f64>,
    pub segments: Vec<Segment>,
}

/// Error body: `{"detail": "..."}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }

    fn processing(message: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: format!("Error processing file: {}", message),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl From<MixmapError> for ApiError {
    fn from(e: MixmapError) -> Self {
        Self::processing(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct Body {
            detail: String,
        }
        (self.status, Json(Body { detail: self.detail })).into_response()
    }
}

// ---- Route registration ----

pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/analyze-key", post(analyze_key))
        .route("/analyze-structure", post(analyze_structure))
}

// ---- Handlers ----

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "OK" })
}

pub async fn analyze_key(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> std::result::Result<Json<KeyResponse>, ApiError> {
    let upload = read_upload(multipart).await?;
    let filename = upload.filename.clone();

    let analyzer = state.analyzer.clone();
    let key = run_blocking(&state, upload, move |buffer, cancel| {
        analyzer.analyze_key(&buffer, cancel)
    })
    .await?;

    debug!("{}: {} ({})", filename, key.label, key.camelot);
    Ok(Json(KeyResponse {
        filename,
        detected_key: key.label,
        camelot_code: key.camelot,
    }))
}

pub async fn analyze_structure(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> std::result::Result<Json<StructureResponse>, ApiError> {
    let upload = read_upload(multipart).await?;
    let filename = upload.filename.clone();

    let analyzer = state.analyzer.clone();
    let structure = run_blocking(&state, upload, move |buffer, cancel| {
        analyzer.analyze_structure(&buffer, cancel)
    })
    .await?;

    debug!(
        "{}: {} segments, {} mix points",
        filename,
        structure.segments.len(),
        structure.mix_points.len()
    );
    Ok(Json(StructureResponse {
        filename,
        duration_sec: structure.duration_sec,
        mix_points: structure.mix_points,
        segments: structure.segments,
    }))
}

// ---- Helpers ----

/// Audio bytes plus the client-supplied file name
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

async fn read_upload(mut multipart: Multipart) -> std::result::Result<Upload, ApiError> {
    loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?;
        let Some(field) = field else {
            return Err(ApiError::bad_request(format!(
                "Missing upload field '{}'",
                UPLOAD_FIELD
            )));
        };
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;
        return Ok(Upload {
            filename,
            bytes: bytes.to_vec(),
        });
    }
}

/// Decode and analyze an upload on the blocking pool
///
/// Waits for a concurrency permit, then runs `analyze` with a token that
/// expires after the request timeout. If this future is dropped the token
/// fires and the blocking work stops at its next check.
async fn run_blocking<T, F>(
    state: &AppState,
    upload: Upload,
    analyze: F,
) -> std::result::Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(crate::types::AudioBuffer, &CancelToken) -> Result<T> + Send + 'static,
{
    let permit = state
        .permits
        .clone()
        .acquire_owned()
        .await
        .map_err(|e| ApiError::processing(format!("server is shutting down ({})", e)))?;

    let cancel = CancelToken::with_timeout(state.settings.request_timeout);
    let guard = CancelOnDrop::new(cancel.clone());

    let handle = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        let buffer = audio::decode_bytes(upload.bytes, &upload.filename, &cancel)?;
        analyze(buffer, &cancel)
    });

    let outcome = handle.await;
    guard.disarm();

    match outcome {
        Ok(result) => result.map_err(|e| {
            warn!("Analysis failed: {}", e);
            ApiError::from(e)
        }),
        Err(e) => Err(ApiError::processing(format!("analysis task failed: {}", e))),
    }
}
