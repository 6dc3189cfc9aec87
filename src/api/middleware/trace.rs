use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{info_span, Instrument};
use uuid::Uuid;

/// HTTP header name for trace ID
pub const TRACE_ID_HEADER: &str = "X-Trace-Id";

tokio::task_local! {
    static TRACE_ID: String;
}

/// Trace ID of the request currently being handled, if any
pub fn current_trace_id() -> Option<String> {
    TRACE_ID.try_with(|id| id.clone()).ok()
}

/// Reuse the caller's trace ID when it is a well-formed UUID
fn incoming_trace_id(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(TRACE_ID_HEADER)?.to_str().ok()?;
    Uuid::parse_str(value).ok().map(|id| id.to_string())
}

/// Middleware that gives every request a trace ID.
///
/// The ID scopes an `http_request` span, is readable through
/// [`current_trace_id`] for error bodies, and is echoed in the response
/// header.
pub async fn trace_id_middleware(request: Request, next: Next) -> Response {
    let trace_id = incoming_trace_id(request.headers())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %request.method(),
        uri = %request.uri(),
    );

    let mut response = TRACE_ID
        .scope(trace_id.clone(), async move {
            let response = next.run(request).await;
            tracing::info!(status = %response.status(), "Request completed");
            response
        })
        .instrument(span)
        .await;

    if let Ok(value) = HeaderValue::from_str(&trace_id) {
        response.headers_mut().insert(TRACE_ID_HEADER, value);
    }

    response
}
