use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Extension, Query, State},
    Json,
};
use serde::Deserialize;

use crate::binding;
use crate::error::ApiError;
use crate::models::{QueryResultNode, QueryResultRepresentation, SearchQuery};
use crate::repository::{Credentials, Node, QueryLanguage, QueryRequest, Repository, Session};
use crate::state::AppState;

use super::utils::with_session;

#[derive(Debug, Default, Deserialize)]
pub struct QueryParams {
    pub statement: Option<String>,
    pub language: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// GET /query?statement=..&language=xpath&limit=200&offset=0
pub async fn get<R: Repository>(
    State(state): State<AppState<R>>,
    Extension(credentials): Extension<Credentials>,
    params: Result<Query<QueryParams>, QueryRejection>,
) -> Result<Json<QueryResultRepresentation>, ApiError> {
    let Query(params) = params?;
    let statement = params
        .statement
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Query parameter 'statement' is required"))?;

    let search = SearchQuery {
        statement,
        language: params.language.unwrap_or_else(|| "xpath".to_string()),
        limit: params.limit.unwrap_or(state.config.api.query_default_limit),
        offset: params.offset.unwrap_or(0),
    };
    execute(&state, credentials, search).await.map(Json)
}

/// POST /query - Same as GET with the query as a JSON body
pub async fn post<R: Repository>(
    State(state): State<AppState<R>>,
    Extension(credentials): Extension<Credentials>,
    body: Result<Json<SearchQuery>, JsonRejection>,
) -> Result<Json<QueryResultRepresentation>, ApiError> {
    let Json(search) = body?;
    if search.statement.trim().is_empty() {
        return Err(ApiError::bad_request("Query statement is required"));
    }
    execute(&state, credentials, search).await.map(Json)
}

async fn execute<R: Repository>(
    state: &AppState<R>,
    credentials: Credentials,
    search: SearchQuery,
) -> Result<QueryResultRepresentation, ApiError> {
    let language: QueryLanguage = search.language.parse()?;
    let request = QueryRequest::new(search.statement, language)
        .limit(search.limit)
        .offset(search.offset);
    let link_base = state.url("/nodes");

    with_session(state, credentials, move |session| {
        let started = Instant::now();
        let result = session.query(&request)?;

        let mut nodes = Vec::with_capacity(result.rows.len());
        for row in &result.rows {
            nodes.push(QueryResultNode {
                score: row.score,
                link: format!("{}{}", link_base, row.node.path()?),
                node: binding::representation_of(&row.node, 0)?,
            });
        }

        let took = started.elapsed().as_millis() as u64;
        tracing::debug!(
            "Query '{}' returned {} of {} hits in {}ms",
            request.statement,
            nodes.len(),
            result.total_hits,
            took
        );
        Ok(QueryResultRepresentation {
            took,
            hits: result.total_hits,
            nodes,
        })
    })
    .await
}
