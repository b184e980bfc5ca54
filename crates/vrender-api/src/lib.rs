//! Axum HTTP API server.
//!
//! This crate provides:
//! - The render endpoint (submit a composition, get back a public URL)
//! - Liveness and readiness probes
//! - Request ID propagation and request logging

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
