//! HTTP router setup.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{self, UploadState};
use super::Uploader;
use crate::middleware::inject_request_id;

/// Multipart framing allowance on top of the file size limit.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the upload router.
pub fn create<U: Uploader + 'static>(uploader: U, max_bytes: usize) -> Router {
    let state = Arc::new(UploadState {
        uploader,
        max_bytes,
        start_time: Instant::now(),
    });
    Router::new()
        .route("/upload", post(handlers::upload::<U>))
        .route("/health", get(handlers::health::<U>))
        .route("/metrics", get(handlers::metrics))
        .layer(DefaultBodyLimit::max(max_bytes + MULTIPART_OVERHEAD))
        .layer(axum::middleware::from_fn(inject_request_id))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
