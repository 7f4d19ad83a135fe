//! Route handlers: one POST endpoint per provider family, enough to drive
//! the masking pipeline end to end. Everything auth/TLS/rate-limit shaped
//! is explicitly out of scope here.

pub mod chat;
pub mod completions;
pub mod health;

use crate::state::AppState;
use axum::{routing::post, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", axum::routing::get(health::healthz))
        .route("/v1/chat/completions", post(chat::chat_completions))
        .route("/v1/completions", post(completions::completions))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
