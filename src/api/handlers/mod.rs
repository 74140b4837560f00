pub mod auth;
pub mod images;

pub use auth::*;
pub use images::*;

use crate::backend::BackendClient;
use crate::core::config::ImagesConfig;
use std::sync::Arc;

/// Shared application state for handlers
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<BackendClient>,
    pub images: Arc<ImagesConfig>,
    /// Outbound client for allow-listed image fetches
    pub image_client: reqwest::Client,
}
