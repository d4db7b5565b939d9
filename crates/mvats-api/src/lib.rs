//! Axum HTTP API for video scene classification.
//!
//! This crate provides:
//! - Single-label and multi-label video prediction over multipart uploads
//! - Health and class listing endpoints
//! - Request id, logging, CORS and body limit middleware
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
