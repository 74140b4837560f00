//! Mangam Portal Library
//!
//! This library provides the core functionality for the Mangam portal service,
//! including the user directory mirror, backend API client, and HTTP gateway.

pub mod api;
pub mod backend;
pub mod core;
pub mod directory;
pub mod model;

// Re-export commonly used types
pub use api::ApiServer;
pub use backend::BackendClient;
pub use crate::core::{Config, ErrorResponse, Logger, PortalError};
pub use directory::{DirectorySnapshot, LoadPhase, UserDirectory};
pub use model::User;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type alias for the library
pub use crate::core::Result;
