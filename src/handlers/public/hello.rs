use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::repository::names::REP_NAME_DESC;
use crate::repository::Repository;
use crate::state::AppState;

/// GET /hello
pub async fn get<R: Repository>(State(state): State<AppState<R>>) -> Json<Value> {
    let name = state
        .repository
        .descriptor(REP_NAME_DESC)
        .unwrap_or_else(|| state.config.repository.name.clone());
    Json(json!({ "message": format!("Hello World from {}", name) }))
}
