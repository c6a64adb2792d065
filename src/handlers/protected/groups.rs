use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Extension, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::error::ApiError;
use crate::models::{Group, GroupCollection};
use crate::repository::{Credentials, Repository, Session};
use crate::services::GroupService;
use crate::state::AppState;

use super::utils::{page_links, with_session, PageParams};

/// GET /groups?limit=20&offset=0
pub async fn list<R: Repository>(
    State(state): State<AppState<R>>,
    Extension(credentials): Extension<Credentials>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<GroupCollection>, ApiError> {
    let Query(params) = params?;
    let limit = state.config.clamp_page_limit(params.limit);
    let offset = params.offset.unwrap_or(0);

    let mut groups = with_session(&state, credentials, move |session| {
        Ok(GroupService::new(session).select_page(limit, offset)?)
    })
    .await?;

    for group in groups.iter_mut() {
        group.href = Some(state.url(&format!("/groups/{}", group.name)));
    }

    Ok(Json(GroupCollection {
        groups,
        links: page_links(&state, "/groups", limit, offset),
    }))
}

/// POST /groups
pub async fn post<R: Repository>(
    State(state): State<AppState<R>>,
    Extension(credentials): Extension<Credentials>,
    body: Result<Json<Group>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(group) = body?;
    let name = group.name.clone();

    with_session(&state, credentials, move |session| {
        GroupService::new(session).create_one(&group)?;
        session.save()?;
        Ok(())
    })
    .await?;

    let location = state.url(&format!("/groups/{}", name));
    Ok((StatusCode::CREATED, [(header::LOCATION, location)]).into_response())
}

/// GET /groups/:name
pub async fn get<R: Repository>(
    State(state): State<AppState<R>>,
    Extension(credentials): Extension<Credentials>,
    Path(name): Path<String>,
) -> Result<Json<Group>, ApiError> {
    let group = with_session(&state, credentials, move |session| {
        Ok(GroupService::new(session).find(&name)?)
    })
    .await?;

    Ok(Json(group))
}

/// DELETE /groups/:name
pub async fn delete<R: Repository>(
    State(state): State<AppState<R>>,
    Extension(credentials): Extension<Credentials>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    with_session(&state, credentials, move |session| {
        GroupService::new(session).delete_404(&name)?;
        session.save()?;
        Ok(())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}
