use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Extension, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::error::ApiError;
use crate::models::{Group, User, UserCollection};
use crate::repository::{Credentials, Repository, Session};
use crate::services::UserService;
use crate::state::AppState;

use super::utils::{page_links, with_session, PageParams};

fn with_group_links<R>(state: &AppState<R>, groups: Vec<Group>) -> Vec<Group> {
    groups
        .into_iter()
        .map(|mut group| {
            group.href = Some(state.url(&format!("/groups/{}", group.name)));
            group
        })
        .collect()
}

/// GET /users?limit=20&offset=0
pub async fn list<R: Repository>(
    State(state): State<AppState<R>>,
    Extension(credentials): Extension<Credentials>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<UserCollection>, ApiError> {
    let Query(params) = params?;
    let limit = state.config.clamp_page_limit(params.limit);
    let offset = params.offset.unwrap_or(0);

    let mut users = with_session(&state, credentials, move |session| {
        Ok(UserService::new(session).select_page(limit, offset)?)
    })
    .await?;

    for user in users.iter_mut() {
        user.uri = Some(state.url(&format!("/users/{}", user.username)));
    }

    Ok(Json(UserCollection {
        users,
        links: page_links(&state, "/users", limit, offset),
    }))
}

/// POST /users - Create a local user; `password` is required
pub async fn post<R: Repository>(
    State(state): State<AppState<R>>,
    Extension(credentials): Extension<Credentials>,
    body: Result<Json<User>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(user) = body?;
    let username = user.username.clone();

    with_session(&state, credentials, move |session| {
        UserService::new(session).create_one(&user)?;
        session.save()?;
        Ok(())
    })
    .await?;

    let location = state.url(&format!("/users/{}", username));
    Ok((StatusCode::CREATED, [(header::LOCATION, location)]).into_response())
}

/// GET /users/me - The account behind the presented credentials
pub async fn me<R: Repository>(
    State(state): State<AppState<R>>,
    Extension(credentials): Extension<Credentials>,
) -> Result<Json<User>, ApiError> {
    let user = with_session(&state, credentials, move |session| {
        Ok(UserService::new(session).find(session.user_id())?)
    })
    .await?;

    Ok(Json(user))
}

/// GET /users/:username - One user including group memberships
pub async fn get<R: Repository>(
    State(state): State<AppState<R>>,
    Extension(credentials): Extension<Credentials>,
    Path(username): Path<String>,
) -> Result<Json<User>, ApiError> {
    let mut user = with_session(&state, credentials, move |session| {
        Ok(UserService::new(session).find(&username)?)
    })
    .await?;

    user.groups = user.groups.take().map(|groups| with_group_links(&state, groups));
    Ok(Json(user))
}

/// DELETE /users/:username
pub async fn delete<R: Repository>(
    State(state): State<AppState<R>>,
    Extension(credentials): Extension<Credentials>,
    Path(username): Path<String>,
) -> Result<StatusCode, ApiError> {
    with_session(&state, credentials, move |session| {
        UserService::new(session).delete_404(&username)?;
        session.save()?;
        Ok(())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /users/:username/groups
pub async fn groups<R: Repository>(
    State(state): State<AppState<R>>,
    Extension(credentials): Extension<Credentials>,
    Path(username): Path<String>,
) -> Result<Json<Vec<Group>>, ApiError> {
    let groups = with_session(&state, credentials, move |session| {
        let service = UserService::new(session);
        service.select_404(&username)?;
        Ok(service.memberships(&username)?)
    })
    .await?;

    Ok(Json(with_group_links(&state, groups)))
}
