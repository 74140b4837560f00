//! Request plumbing shared by all backend calls

use crate::core::config::BackendConfig;
use crate::core::error::{PortalError, Result};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Client for the MangaM backend REST API
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
}

impl BackendClient {
    /// Build a client from configuration
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()
            .map_err(|e| PortalError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The normalized backend base URL (no trailing slash)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a request; only transport failures are errors here
    pub(crate) async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method.clone(), &url);
        if let Some(json) = body {
            request = request.json(json);
        }

        request
            .send()
            .await
            .map_err(|e| PortalError::NetworkError(format!("{} {}: {}", method, path, e)))
    }

    /// GET a JSON document
    ///
    /// Non-success responses become errors that embed the response body text;
    /// a 404 is surfaced as [`PortalError::NotFound`].
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.dispatch(Method::GET, path, None).await?;

        let status = response.status();
        if !status.is_success() {
            let body = read_body(response).await;
            let message = format!("GET {} returned {}: {}", path, status.as_u16(), body);
            return Err(if status == StatusCode::NOT_FOUND {
                PortalError::NotFound(message)
            } else {
                PortalError::FetchError(message)
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| PortalError::DeserializationError(format!("GET {}: {}", path, e)))
    }

    /// Issue a mutating request, discarding any success body
    pub(crate) async fn write(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<()> {
        let response = self.dispatch(method.clone(), path, body.as_ref()).await?;

        let status = response.status();
        if !status.is_success() {
            let text = read_body(response).await;
            return Err(PortalError::WriteError(format!(
                "{} {} returned {}: {}",
                method,
                path,
                status.as_u16(),
                text
            )));
        }

        Ok(())
    }
}

/// Drain a response body for an error message
pub(crate) async fn read_body(response: Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::test_support::{client_for, spawn_backend, unreachable_client};
    use axum::{http::StatusCode, routing::get, Router};

    #[tokio::test]
    async fn test_base_url_trailing_slash_normalized() {
        let config = BackendConfig {
            base_url: "http://127.0.0.1:8080/".to_string(),
            request_timeout: 5,
        };
        let client = BackendClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8080");
    }

    #[tokio::test]
    async fn test_get_json_embeds_error_body() {
        let app = Router::new().route(
            "/api/users",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "db down") }),
        );
        let base = spawn_backend(app).await;
        let client = client_for(&base);

        let err = client
            .get_json::<Vec<crate::model::User>>("/api/users")
            .await
            .unwrap_err();

        match err {
            PortalError::FetchError(message) => {
                assert!(message.contains("500"));
                assert!(message.contains("db down"));
            }
            other => panic!("expected FetchError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_json_maps_404_to_not_found() {
        let app = Router::new().route(
            "/manga/99",
            get(|| async { (StatusCode::NOT_FOUND, "Manga not found") }),
        );
        let base = spawn_backend(app).await;
        let client = client_for(&base);

        let err = client
            .get_json::<crate::model::Manga>("/manga/99")
            .await
            .unwrap_err();

        match err {
            PortalError::NotFound(message) => assert!(message.contains("Manga not found")),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_is_network_error() {
        let client = unreachable_client();

        let err = client
            .get_json::<Vec<crate::model::User>>("/api/users")
            .await
            .unwrap_err();

        assert!(matches!(err, PortalError::NetworkError(_)));
    }

    #[tokio::test]
    async fn test_malformed_body_is_deserialization_error() {
        let app = Router::new().route("/api/users", get(|| async { "not json" }));
        let base = spawn_backend(app).await;
        let client = client_for(&base);

        let err = client
            .get_json::<Vec<crate::model::User>>("/api/users")
            .await
            .unwrap_err();

        assert!(matches!(err, PortalError::DeserializationError(_)));
    }
}
