use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::binding;
use crate::error::ApiError;
use crate::models::PropertyRepresentation;
use crate::repository::{split_path, Credentials, Node, Repository, Session};
use crate::state::AppState;

use super::utils::{request_path, require_node, with_session};

fn require_property<S: Session>(session: &S, path: &str) -> Result<(S::Node, String), ApiError> {
    if !session.property_exists(path)? {
        return Err(ApiError::not_found(format!("No property at {}", path)));
    }
    let (parent, name) =
        split_path(path).ok_or_else(|| ApiError::not_found(format!("No property at {}", path)))?;
    Ok((session.node(&parent)?, name))
}

/// GET /properties/*path
pub async fn get<R: Repository>(
    State(state): State<AppState<R>>,
    Extension(credentials): Extension<Credentials>,
    path: Option<Path<String>>,
) -> Result<Json<PropertyRepresentation>, ApiError> {
    let path = request_path(path);

    let representation = with_session(&state, credentials, move |session| {
        if !session.property_exists(&path)? {
            return Err(ApiError::not_found(format!("No property at {}", path)));
        }
        Ok(binding::property_representation_of(&session.property(&path)?))
    })
    .await?;

    Ok(Json(representation))
}

/// POST /properties/*path - Add the submitted property to the node at `path`
pub async fn post<R: Repository>(
    State(state): State<AppState<R>>,
    Extension(credentials): Extension<Credentials>,
    path: Option<Path<String>>,
    body: Result<Json<PropertyRepresentation>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(property) = body?;
    let node_path = request_path(path);

    let created_path = with_session(&state, credentials, move |session| {
        let node = require_node(session, &node_path)?;
        if property.name.trim().is_empty() {
            return Err(ApiError::bad_request("Property name is required"));
        }
        if node.has_property(&property.name)? {
            return Err(ApiError::conflict(format!(
                "Property '{}' already exists on {}",
                property.name, node_path
            )));
        }

        binding::apply_property(&node, &property)?;
        session.save()?;
        Ok(node.property(&property.name)?.path)
    })
    .await?;

    let location = state.url(&format!("/properties{}", created_path));
    Ok((StatusCode::CREATED, [(header::LOCATION, location)]).into_response())
}

/// PUT /properties/*path - Overwrite the property's values (and cardinality)
pub async fn put<R: Repository>(
    State(state): State<AppState<R>>,
    Extension(credentials): Extension<Credentials>,
    path: Option<Path<String>>,
    body: Result<Json<PropertyRepresentation>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(mut property) = body?;
    let path = request_path(path);

    with_session(&state, credentials, move |session| {
        let (node, name) = require_property(session, &path)?;
        // the addressed property wins over whatever name the body carries
        property.name = name;
        binding::apply_property(&node, &property)?;
        session.save()?;
        Ok(())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /properties/*path
pub async fn delete<R: Repository>(
    State(state): State<AppState<R>>,
    Extension(credentials): Extension<Credentials>,
    path: Option<Path<String>>,
) -> Result<StatusCode, ApiError> {
    let path = request_path(path);

    with_session(&state, credentials, move |session| {
        let (node, name) = require_property(session, &path)?;
        node.remove_property(&name)?;
        session.save()?;
        tracing::info!("Deleted property {}", path);
        Ok(())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}
