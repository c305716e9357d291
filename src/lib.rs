//! Rate limited gateway that polishes text through a hosted language model.
//!
//! `POST /api/generate` resolves a client id from forwarding headers, checks
//! it against a fixed-window [`rate_limit::RateLimiter`], and forwards
//! admitted requests to the configured [`providers::Provider`].

pub mod cache;
pub mod client_id;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod prompt;
pub mod providers;
pub mod rate_limit;
pub mod state;
pub mod sweeper;

use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;

use crate::state::AppState;

// Router with every route the gateway serves
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/api/generate", post(handlers::generate_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(state)
}
