// HTTP API Error Types
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use crate::auth::AuthError;
use crate::binding::BindingError;
use crate::repository::RepositoryError;
use crate::services::ServiceError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    InvalidJson(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::InvalidJson(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::InternalServerError(_) => 500,
        }
    }

    /// Detailed message, as raised
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::InvalidJson(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Message sent to the client. Statuses whose detail may leak internals are
    /// reduced to their reason phrase; conflicts and denials keep their text.
    pub fn client_message(&self) -> String {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match status {
            StatusCode::BAD_REQUEST
            | StatusCode::UNAUTHORIZED
            | StatusCode::NOT_FOUND
            | StatusCode::NOT_ACCEPTABLE
            | StatusCode::INTERNAL_SERVER_ERROR => status
                .canonical_reason()
                .unwrap_or_default()
                .to_string(),
            _ => self.message().to_string(),
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "statusCode": self.status_code(),
            "message": self.client_message(),
        })
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }
}

// Convert other error types to ApiError
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Login(msg) => ApiError::unauthorized(msg),
            RepositoryError::AccessDenied(msg) => ApiError::forbidden(format!("Access denied: {}", msg)),
            RepositoryError::PathNotFound(msg) => ApiError::not_found(msg),
            RepositoryError::ItemExists(path) => ApiError::conflict(format!("Item already exists: {}", path)),
            RepositoryError::InvalidItemState(msg) => ApiError::conflict(msg),
            RepositoryError::InvalidQuery(_)
            | RepositoryError::ConstraintViolation(_)
            | RepositoryError::ValueFormat(_)
            | RepositoryError::NoSuchNodeType(_)
            | RepositoryError::InvalidPath(_) => ApiError::bad_request(err.to_string()),
            RepositoryError::Internal(msg) => {
                // Log the real error but return generic message
                tracing::error!("Repository error: {}", msg);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<BindingError> for ApiError {
    fn from(err: BindingError) -> Self {
        match err {
            BindingError::Repository(e) => e.into(),
            other => ApiError::bad_request(other.to_string()),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(msg) => ApiError::not_found(msg),
            ServiceError::Conflict(msg) => ApiError::conflict(msg),
            ServiceError::Validation(msg) => ApiError::bad_request(msg),
            ServiceError::Repository(e) => e.into(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::unauthorized(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_json(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status != StatusCode::INTERNAL_SERVER_ERROR {
            tracing::debug!("Request failed with {}: {}", status, self.message());
        }

        let mut response = (status, Json(self.to_json())).into_response();
        if let ApiError::Unauthorized(_) = self {
            let challenge = format!("Basic realm=\"{}\"", crate::config::config().security.realm);
            if let Ok(value) = HeaderValue::from_str(&challenge) {
                response.headers_mut().insert(header::WWW_AUTHENTICATE, value);
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_normalized_to_reason_phrase() {
        let err = ApiError::bad_request("Unknown property type 'Text'");
        assert_eq!(err.to_json(), json!({"statusCode": 400, "message": "Bad Request"}));

        let err: ApiError = RepositoryError::PathNotFound("/missing".to_string()).into();
        assert_eq!(err.client_message(), "Not Found");

        let err: ApiError = RepositoryError::Internal("disk on fire".to_string()).into();
        assert_eq!(err.client_message(), "Internal Server Error");
    }

    #[test]
    fn test_conflicts_keep_their_message() {
        let err: ApiError = RepositoryError::ItemExists("/a".to_string()).into();
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.client_message(), "Item already exists: /a");
    }

    #[test]
    fn test_binding_errors_map_to_bad_request() {
        let err: ApiError = BindingError::MissingValue("p".to_string()).into();
        assert_eq!(err.status_code(), 400);

        let err: ApiError = BindingError::Repository(RepositoryError::ItemExists("/a".to_string())).into();
        assert_eq!(err.status_code(), 409);
    }

    #[test]
    fn test_unauthorized_response_carries_challenge() {
        let response = ApiError::unauthorized("Please authenticate.").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let challenge = response.headers().get(header::WWW_AUTHENTICATE).unwrap();
        assert!(challenge.to_str().unwrap().starts_with("Basic realm="));
    }
}
