//! Typed HTTP client for the MangaM backend API
//!
//! [`client`] holds the request plumbing, [`users`] the user-administration
//! calls, [`catalog`] the read-only manga browsing calls.

pub mod catalog;
pub mod client;
pub mod users;

pub use catalog::{MangaQuery, SortField, SortOrder};
pub use client::BackendClient;

#[cfg(test)]
pub(crate) mod test_support {
    use axum::Router;

    /// Bind a stub backend on an ephemeral port and return its base URL
    ///
    /// The serve task is dropped with the test runtime.
    pub(crate) async fn spawn_backend(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    /// A client pointed at a port nothing listens on
    pub(crate) fn unreachable_client() -> crate::backend::BackendClient {
        let config = crate::core::config::BackendConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            request_timeout: 2,
        };
        crate::backend::BackendClient::new(&config).unwrap()
    }

    pub(crate) fn client_for(base_url: &str) -> crate::backend::BackendClient {
        let config = crate::core::config::BackendConfig {
            base_url: base_url.to_string(),
            request_timeout: 5,
        };
        crate::backend::BackendClient::new(&config).unwrap()
    }
}
