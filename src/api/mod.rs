//! REST API module
//!
//! This module provides the portal's HTTP surface:
//! - API routing and request handling
//! - Trace ID middleware
//! - Session and image proxy handlers

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;

pub use middleware::{trace_id_middleware, TraceId, TRACE_ID_HEADER};
pub use models::MessageResponse;
pub use server::ApiServer;
