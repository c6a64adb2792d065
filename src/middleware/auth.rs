use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{parse_basic_authorization, AuthError};
use crate::error::ApiError;

/// Basic authentication middleware: decodes the credentials and injects them into the request.
///
/// Credentials are checked when the handler logs in to the repository, so a
/// wrong password still surfaces as 401 from the handler.
pub async fn basic_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header_value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::MalformedCredentials("header is not valid ASCII".to_string()))?;

    let credentials = parse_basic_authorization(header_value)?;
    tracing::debug!("Decoded credentials for user '{}'", credentials.username);
    request.extensions_mut().insert(credentials);

    Ok(next.run(request).await)
}
