//! `POST /v1/chat/completions`.

use crate::error::ApiResult;
use crate::state::AppState;
use crate::upstream::dispatch_and_forward;
use axum::extract::State;
use axum::response::Response;
use axum::Json;
use proxy_mask::StreamShape;
use serde_json::Value;

pub async fn chat_completions(
    State(state): State<AppState>,
    Json(request): Json<Value>,
) -> ApiResult<Response> {
    dispatch_and_forward(&state, &request, StreamShape::ChatDelta).await
}
