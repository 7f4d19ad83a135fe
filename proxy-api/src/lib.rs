//! proxy-api - HTTP front door for the masking proxy.
//!
//! Everything here is ambient plumbing, not the masking engine itself: a
//! minimal axum router wiring one POST route per provider family to the
//! orchestrator, enough to drive the whole pipeline end to end. No
//! auth/TLS/rate-limiting - those are out of scope and left to whatever
//! sits in front of this service.

pub mod error;
pub mod routes;
pub mod state;
pub mod upstream;

pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::AppState;

use axum::Router;

pub fn create_router(state: AppState) -> Router {
    routes::router(state)
}
