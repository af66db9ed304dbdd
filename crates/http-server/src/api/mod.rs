use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::Level;

use crate::core::AppState;

pub mod health;
pub mod webhook;

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(health::liveness_handler))
        .route("/webhook", post(webhook::webhook_handler))
        .layer(
            TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
