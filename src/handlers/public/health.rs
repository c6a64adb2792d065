use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::repository::Repository;
use crate::state::AppState;

/// GET /health - Liveness only; does not log in to the repository
pub async fn get<R: Repository>(State(state): State<AppState<R>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime": Utc::now().signed_duration_since(state.started_at).num_seconds(),
    }))
}
