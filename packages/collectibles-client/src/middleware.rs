//! Upload request correlation.

use axum::extract::Request;
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Correlation id of one upload request, stored in request extensions.
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

impl RequestId {
    /// Reuse a caller-supplied id that is a valid header value, else mint one.
    fn from_request(request: &Request) -> Self {
        let supplied = request
            .headers()
            .get(&REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty());
        match supplied {
            Some(id) => Self(id.to_string()),
            None => Self(format!("upl-{:016x}", rand::random::<u64>())),
        }
    }
}

/// Tag each upload request with a [`RequestId`] and echo it on the response.
pub async fn inject_request_id(mut request: Request, next: Next) -> Response {
    let id = RequestId::from_request(&request);
    debug!(req_id = %id.0, path = %request.uri().path(), "Upload request");
    request.extensions_mut().insert(id.clone());

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&id.0) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
