//! Bazaar admin library.
//!
//! The moderation console API and the product status endpoint, built as a
//! library so the router can be exercised in tests.
//!
//! # Security
//!
//! This crate holds the service role key, which bypasses row-level
//! security. Every route checks the caller's admin flag before touching
//! data. Only deploy on private infrastructure.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

#[cfg(test)]
mod testing;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the admin router: health check, status endpoint and console.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
