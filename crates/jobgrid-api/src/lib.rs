//! Axum HTTP API server for the JobGrid backend.
//!
//! This crate provides:
//! - The REST resource gateway over the pipeline engine
//! - JWT access/refresh tokens and Google sign-in
//! - Rate limiting, CORS and request logging
//! - Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod pagination;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
