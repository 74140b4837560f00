use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::{info_span, Instrument};
use uuid::Uuid;

/// HTTP header name for trace ID
pub const TRACE_ID_HEADER: &str = "X-Trace-Id";

/// Extension type carrying the request's trace ID
#[derive(Clone, Debug)]
pub struct TraceId(pub String);

impl TraceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Middleware that assigns each request a UUID trace ID
///
/// The ID lands in the request extensions, in a span wrapping every log line
/// of the request, and in the `X-Trace-Id` response header.
pub async fn trace_id_middleware(request: Request, next: Next) -> Response {
    let trace_id = Uuid::new_v4().to_string();

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %request.method(),
        uri = %request.uri(),
    );

    let mut request = request;
    request.extensions_mut().insert(TraceId(trace_id.clone()));

    let response = async move {
        tracing::info!("Request started");
        let response = next.run(request).await;
        tracing::info!(status = %response.status(), "Request completed");
        response
    }
    .instrument(span)
    .await;

    let (mut parts, body) = response.into_parts();
    parts.headers.insert(
        TRACE_ID_HEADER,
        HeaderValue::from_str(&trace_id).unwrap_or_else(|_| HeaderValue::from_static("invalid")),
    );

    Response::from_parts(parts, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware,
        response::IntoResponse,
        routing::get,
        Extension, Router,
    };
    use tower::util::ServiceExt;

    async fn echo_trace(Extension(trace_id): Extension<TraceId>) -> impl IntoResponse {
        (StatusCode::OK, trace_id.as_str().to_owned())
    }

    fn test_app() -> Router {
        Router::new()
            .route("/test", get(echo_trace))
            .layer(middleware::from_fn(trace_id_middleware))
    }

    #[tokio::test]
    async fn test_header_matches_extension_and_is_a_uuid() {
        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        let response = test_app().oneshot(request).await.unwrap();

        let header_trace_id = response
            .headers()
            .get(TRACE_ID_HEADER)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(Uuid::parse_str(&header_trace_id).is_ok());

        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body_trace_id = String::from_utf8(body_bytes.to_vec()).unwrap();

        assert_eq!(header_trace_id, body_trace_id);
    }

    #[tokio::test]
    async fn test_trace_id_unique_per_request() {
        let mut seen = Vec::new();
        for _ in 0..2 {
            let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
            let response = test_app().oneshot(request).await.unwrap();
            seen.push(
                response
                    .headers()
                    .get(TRACE_ID_HEADER)
                    .unwrap()
                    .to_str()
                    .unwrap()
                    .to_string(),
            );
        }

        assert_ne!(seen[0], seen[1]);
    }
}
