//! HTTP handlers for the upload endpoint.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

use super::{UploadError, UploadFile, Uploader};
use crate::metrics::METRICS;
use crate::middleware::RequestId;

/// Shared handler state.
pub struct UploadState<U> {
    pub uploader: U,
    pub max_bytes: usize,
    pub start_time: Instant,
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let status = match &self {
            UploadError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            UploadError::UnsupportedType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            UploadError::Missing => StatusCode::BAD_REQUEST,
            UploadError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = json!({
            "success": false,
            "error": self.to_string()
        });
        (status, Json(body)).into_response()
    }
}

/// Store the multipart field `file`.
pub async fn upload<U: Uploader>(
    State(state): State<Arc<UploadState<U>>>,
    Extension(req_id): Extension<RequestId>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, UploadError> {
    let file = loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(UploadError::Missing),
            Err(e) => return Err(multipart_error(&*state, &req_id, e.status(), e.body_text())),
        };
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(&*state, &req_id, e.status(), e.body_text()))?;
        break UploadFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        };
    };

    let path = state.uploader.upload(file).await?;
    Ok(Json(json!({ "success": true, "path": path })))
}

fn multipart_error<U>(
    state: &UploadState<U>,
    req_id: &RequestId,
    status: StatusCode,
    detail: String,
) -> UploadError {
    METRICS.uploads_rejected.fetch_add(1, Ordering::Relaxed);
    warn!(req_id = %req_id.0, %status, error = %detail, "Malformed upload");
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::TooLarge {
            limit: state.max_bytes,
        }
    } else {
        UploadError::Missing
    }
}

pub async fn health<U: Uploader>(State(state): State<Arc<UploadState<U>>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

/// Prometheus metrics in text exposition format.
pub async fn metrics() -> impl IntoResponse {
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4",
        )],
        METRICS.render(),
    )
}
