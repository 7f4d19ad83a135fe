//! `POST /v1/completions` (legacy).

use crate::error::ApiResult;
use crate::state::AppState;
use crate::upstream::dispatch_and_forward;
use axum::extract::State;
use axum::response::Response;
use axum::Json;
use proxy_mask::StreamShape;
use serde_json::Value;

pub async fn completions(
    State(state): State<AppState>,
    Json(request): Json<Value>,
) -> ApiResult<Response> {
    dispatch_and_forward(&state, &request, StreamShape::CompletionText).await
}
