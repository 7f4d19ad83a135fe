//! Liveness endpoint. No readiness dependency on the analyzer: it's
//! polled per-request, not once at startup.

use axum::Json;
use serde_json::{json, Value};

pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
