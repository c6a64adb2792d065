pub mod group_service;
pub mod user_service;

pub use group_service::GroupService;
pub use user_service::UserService;

use crate::repository::RepositoryError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Escape a value for use inside a single-quoted query literal
pub(crate) fn quote_literal(value: &str) -> String {
    value.replace('\'', "''")
}
