//! HTTP API module
//!
//! JSON endpoints a dashboard front end reads the card from and drives it
//! through.

pub mod error;
pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

pub use error::ApiError;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/card", get(card_handler))
        .route("/card/duration", post(duration_handler))
        .route("/card/start", post(start_handler))
        .route("/card/pause", post(pause_handler))
        .route("/card/cancel", post(cancel_handler))
        .route("/card/config", get(get_config_handler).put(put_config_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
