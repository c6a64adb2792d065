use axum::extract::Path;
use serde::Deserialize;
use url::Url;

use crate::error::ApiError;
use crate::models::Link;
use crate::repository::{absolute_path, Credentials, Repository, Session};
use crate::state::AppState;

/// Run `work` inside a fresh repository session on the blocking pool.
///
/// The session lives only for the closure. Anything the closure did not save
/// is discarded when it returns, including on error.
pub async fn with_session<R, T, F>(state: &AppState<R>, credentials: Credentials, work: F) -> Result<T, ApiError>
where
    R: Repository,
    T: Send + 'static,
    F: FnOnce(&R::Session) -> Result<T, ApiError> + Send + 'static,
{
    let repository = state.repository.clone();
    tokio::task::spawn_blocking(move || {
        let session = repository.login(&credentials)?;
        let result = work(&session);
        session.logout();
        result
    })
    .await
    .map_err(|e| {
        tracing::error!("Repository task failed: {}", e);
        ApiError::internal_server_error("An error occurred while processing your request")
    })?
}

/// `?limit=&offset=` on paged collections
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Absolute repository path from an optional wildcard path segment
pub fn request_path(path: Option<Path<String>>) -> String {
    absolute_path(&raw_path(&path))
}

pub fn raw_path(path: &Option<Path<String>>) -> String {
    path.as_ref().map(|Path(p)| p.clone()).unwrap_or_default()
}

/// `prev` (only past the first page), `first` and `next` links for a paged collection
pub fn page_links<R>(state: &AppState<R>, collection: &str, limit: u64, offset: u64) -> Vec<Link> {
    let base = state.url(collection);
    let href = |offset: u64, limit: Option<u64>| -> String {
        match Url::parse(&base) {
            Ok(mut url) => {
                {
                    let mut query = url.query_pairs_mut();
                    query.append_pair("offset", &offset.to_string());
                    if let Some(limit) = limit {
                        query.append_pair("limit", &limit.to_string());
                    }
                }
                url.to_string()
            }
            Err(_) => match limit {
                Some(limit) => format!("{}?offset={}&limit={}", base, offset, limit),
                None => format!("{}?offset={}", base, offset),
            },
        }
    };

    let default_limit = state.config.api.page_default_limit;
    let mut links = Vec::with_capacity(3);
    if offset > 0 {
        links.push(Link::new("prev", href(offset.saturating_sub(limit), Some(limit))));
    }
    links.push(Link::new("first", href(0, Some(default_limit))));
    links.push(Link::new(
        "next",
        href(offset.saturating_add(limit), if limit > 0 { Some(limit) } else { None }),
    ));
    links
}

/// Fail with 404 unless the node exists
pub fn require_node<S: Session>(session: &S, path: &str) -> Result<S::Node, ApiError> {
    if !session.node_exists(path)? {
        return Err(ApiError::not_found(format!("No node at {}", path)));
    }
    Ok(session.node(path)?)
}
