use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Extension, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::binding;
use crate::error::ApiError;
use crate::models::NodeRepresentation;
use crate::repository::{Credentials, Node, Repository, Session};
use crate::state::AppState;

use super::utils::{request_path, require_node, with_session};

#[derive(Debug, Default, Deserialize)]
pub struct DepthParams {
    /// Levels of children to include; defaults to the configured depth
    pub depth: Option<u32>,
}

/// GET /nodes/*path - Node representation, children expanded to `depth`
pub async fn get<R: Repository>(
    State(state): State<AppState<R>>,
    Extension(credentials): Extension<Credentials>,
    path: Option<Path<String>>,
    params: Result<Query<DepthParams>, QueryRejection>,
) -> Result<Json<NodeRepresentation>, ApiError> {
    let Query(params) = params?;
    let path = request_path(path);
    let depth = state.config.clamp_depth(params.depth);

    let representation = with_session(&state, credentials, move |session| {
        let node = require_node(session, &path)?;
        Ok(binding::representation_of(&node, depth)?)
    })
    .await?;

    Ok(Json(representation))
}

/// POST /nodes/*path - Create the submitted node (and its subtree) below `path`
pub async fn post<R: Repository>(
    State(state): State<AppState<R>>,
    Extension(credentials): Extension<Credentials>,
    path: Option<Path<String>>,
    body: Result<Json<NodeRepresentation>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(representation) = body?;
    let parent_path = request_path(path);

    let created_path = with_session(&state, credentials, move |session| {
        let parent = require_node(session, &parent_path)?;
        if representation.name.trim().is_empty() {
            return Err(ApiError::bad_request("Node name is required"));
        }
        if representation.primary_type.trim().is_empty() {
            return Err(ApiError::bad_request("Node primaryType is required"));
        }

        let node = parent.add_node(&representation.name, &representation.primary_type)?;
        binding::populate(&node, &representation)?;
        session.save()?;

        let created = node.path()?;
        tracing::info!("Created node {}", created);
        Ok(created)
    })
    .await?;

    let location = state.url(&format!("/nodes{}", created_path));
    Ok((StatusCode::CREATED, [(header::LOCATION, location)]).into_response())
}

/// PUT /nodes/*path - Replace the node's content in place; the identifier survives
pub async fn put<R: Repository>(
    State(state): State<AppState<R>>,
    Extension(credentials): Extension<Credentials>,
    path: Option<Path<String>>,
    body: Result<Json<NodeRepresentation>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(representation) = body?;
    let path = request_path(path);
    if path == "/" {
        return Err(ApiError::bad_request("The root node cannot be replaced"));
    }

    with_session(&state, credentials, move |session| {
        let node = require_node(session, &path)?;
        binding::reset_node(&node, &representation)?;
        session.save()?;
        tracing::info!("Replaced node {}", path);
        Ok(())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /nodes/*path - Remove the node and its subtree
pub async fn delete<R: Repository>(
    State(state): State<AppState<R>>,
    Extension(credentials): Extension<Credentials>,
    path: Option<Path<String>>,
) -> Result<StatusCode, ApiError> {
    let path = request_path(path);
    if path == "/" {
        return Err(ApiError::not_found("No node path given"));
    }

    with_session(&state, credentials, move |session| {
        require_node(session, &path)?.remove()?;
        session.save()?;
        tracing::info!("Deleted node {}", path);
        Ok(())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}
