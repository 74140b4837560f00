//! Remote-image proxy
//!
//! Cover art lives on external hosts; the frontend loads it through this
//! endpoint so only allow-listed sources are ever fetched.

use crate::api::handlers::AppState;
use crate::core::error::{PortalError, Result};
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use bytes::Bytes;
use url::Url;

/// Query parameters for the cover proxy
#[derive(Debug, serde::Deserialize)]
pub struct CoverProxyQuery {
    /// Absolute URL of the remote image
    pub url: String,
}

/// Handler for GET /api/proxy/cover - fetch an allow-listed remote image
pub async fn proxy_cover(
    State(state): State<AppState>,
    Query(params): Query<CoverProxyQuery>,
) -> Result<impl IntoResponse> {
    let remote = Url::parse(&params.url)
        .map_err(|e| PortalError::InvalidRequest(format!("url is not a valid URL: {}", e)))?;

    if !state.images.allows(&remote) {
        return Err(PortalError::ForbiddenImageHost(params.url));
    }

    let response = state
        .image_client
        .get(remote.clone())
        .send()
        .await
        .map_err(|e| PortalError::NetworkError(format!("GET {}: {}", remote, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(PortalError::FetchError(format!(
            "GET {} returned {}",
            remote,
            status.as_u16()
        )));
    }

    // Prefer the upstream content type, fall back to guessing from the path
    let mime_type = response
        .headers()
        .get(header::CONTENT_TYPE.as_str())
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| {
            mime_guess::from_path(remote.path())
                .first_or_octet_stream()
                .to_string()
        });

    let image_data: Bytes = response
        .bytes()
        .await
        .map_err(|e| PortalError::NetworkError(format!("GET {}: {}", remote, e)))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime_type),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*".to_string()),
            (header::CACHE_CONTROL, "public, max-age=31536000".to_string()),
            (
                "Cross-Origin-Resource-Policy".parse().unwrap(),
                "cross-origin".to_string(),
            ),
        ],
        image_data,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::test_support::{spawn_backend, unreachable_client};
    use crate::core::config::{ImagesConfig, RemotePattern};
    use crate::core::error::ErrorResponse;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::get;
    use axum::Router;
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn app_with(images: ImagesConfig) -> Router {
        let state = AppState {
            backend: Arc::new(unreachable_client()),
            images: Arc::new(images),
            image_client: reqwest::Client::new(),
        };
        Router::new()
            .route("/api/proxy/cover", get(proxy_cover))
            .with_state(state)
    }

    fn proxy_request(target: &str) -> Request<Body> {
        Request::builder()
            .uri(format!(
                "/api/proxy/cover?url={}",
                urlencoding::encode(target)
            ))
            .body(Body::empty())
            .unwrap()
    }

    /// Pattern matching the stub image server spawned by these tests
    fn local_pattern(base: &str) -> RemotePattern {
        let parsed = Url::parse(base).unwrap();
        RemotePattern {
            protocol: "http".to_string(),
            hostname: parsed.host_str().unwrap().to_string(),
            port: parsed.port(),
            pathname: "**".to_string(),
        }
    }

    async fn error_body(response: axum::response::Response) -> ErrorResponse {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_disallowed_host_is_forbidden() {
        let app = app_with(ImagesConfig::default());

        let response = app
            .oneshot(proxy_request("https://evil.example/cover.png"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = error_body(response).await;
        assert_eq!(body.error, "ForbiddenImageHost");
        assert!(body.message.contains("evil.example"));
    }

    #[tokio::test]
    async fn test_non_https_default_host_is_forbidden() {
        let app = app_with(ImagesConfig::default());

        let response = app
            .oneshot(proxy_request("http://placehold.co/cover.png"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_unparseable_url_is_bad_request() {
        let app = app_with(ImagesConfig::default());

        let response = app.oneshot(proxy_request("not a url")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_allowed_fetch_passes_through() {
        let png = [0x89u8, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
        let stub = Router::new().route(
            "/covers/1.png",
            get(move || async move {
                ([(header::CONTENT_TYPE, "image/png")], png.to_vec())
            }),
        );
        let base = spawn_backend(stub).await;
        let app = app_with(ImagesConfig {
            remote_patterns: vec![local_pattern(&base)],
        });

        let target = format!("{}/covers/1.png", base);
        let response = app.oneshot(proxy_request(&target)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/png"
        );
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "public, max-age=31536000"
        );
        assert_eq!(
            response
                .headers()
                .get("Cross-Origin-Resource-Policy")
                .unwrap(),
            "cross-origin"
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body.as_ref(), png);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_bad_gateway() {
        let stub = Router::new().route(
            "/covers/404.png",
            get(|| async { (StatusCode::NOT_FOUND, "gone") }),
        );
        let base = spawn_backend(stub).await;
        let app = app_with(ImagesConfig {
            remote_patterns: vec![local_pattern(&base)],
        });

        let target = format!("{}/covers/404.png", base);
        let response = app.oneshot(proxy_request(&target)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = error_body(response).await;
        assert_eq!(body.error, "FetchError");
    }

    #[tokio::test]
    async fn test_pathname_scope_enforced() {
        let base = "http://127.0.0.1:9"; // never dialed
        let images = ImagesConfig {
            remote_patterns: vec![RemotePattern {
                protocol: "http".to_string(),
                hostname: "127.0.0.1".to_string(),
                port: Some(9),
                pathname: "/covers/**".to_string(),
            }],
        };
        let app = app_with(images);

        let response = app
            .clone()
            .oneshot(proxy_request(&format!("{}/secrets/key.pem", base)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        // A path that only shares the string prefix stays out too
        let response = app
            .oneshot(proxy_request(&format!("{}/coversecret/key.pem", base)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
