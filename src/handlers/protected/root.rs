use axum::{
    extract::{Extension, State},
    Json,
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::repository::names::{CLUSTER_ID_DESC, REP_NAME_DESC, REP_VERSION_DESC};
use crate::repository::{Credentials, Repository};
use crate::state::AppState;

use super::utils::with_session;

/// GET / - Basic information about the repository instance
pub async fn get<R: Repository>(
    State(state): State<AppState<R>>,
    Extension(credentials): Extension<Credentials>,
) -> Result<Json<Value>, ApiError> {
    with_session(&state, credentials, |_| Ok(())).await?;

    let repository = &state.repository;
    Ok(Json(json!({
        "clusterid": repository.descriptor(CLUSTER_ID_DESC),
        "vendor": {
            "name": repository.descriptor(REP_NAME_DESC),
            "version": repository.descriptor(REP_VERSION_DESC),
        }
    })))
}
