use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;
use uuid::Uuid;

use crate::repository::Credentials;

const HASH_ALGORITHM: &str = "SHA-256";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingHeader,

    #[error("Authorization header must use Basic scheme")]
    UnsupportedScheme,

    #[error("Malformed Basic credentials: {0}")]
    MalformedCredentials(String),

    #[error("Password hash is not in a supported format")]
    UnsupportedHash,
}

/// Decode the value of an `Authorization: Basic ...` header
pub fn parse_basic_authorization(header: &str) -> Result<Credentials, AuthError> {
    let header = header.trim();
    let (scheme, encoded) = header
        .split_once(' ')
        .ok_or(AuthError::UnsupportedScheme)?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return Err(AuthError::UnsupportedScheme);
    }

    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|e| AuthError::MalformedCredentials(e.to_string()))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|_| AuthError::MalformedCredentials("credentials are not UTF-8".to_string()))?;

    let (username, password) = decoded
        .split_once(':')
        .ok_or_else(|| AuthError::MalformedCredentials("missing ':' separator".to_string()))?;
    if username.is_empty() {
        return Err(AuthError::MalformedCredentials("empty username".to_string()));
    }

    Ok(Credentials::new(username, password))
}

/// Build an `Authorization` header value for the given credentials
pub fn basic_authorization(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password)))
}

/// Salted hash in the `$SHA-256$<salt>$<hex digest>` format stored on user nodes
pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    hash_with_salt(password, &salt)
}

fn hash_with_salt(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("${}${}${:x}", HASH_ALGORITHM, salt, hasher.finalize())
}

pub fn verify_password(password: &str, stored: &str) -> Result<bool, AuthError> {
    let mut parts = stored.split('$');
    // leading empty segment before the first '$'
    let (Some(""), Some(algorithm), Some(salt), Some(_digest), None) =
        (parts.next(), parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(AuthError::UnsupportedHash);
    };
    if algorithm != HASH_ALGORITHM {
        return Err(AuthError::UnsupportedHash);
    }
    Ok(bool::from(hash_with_salt(password, salt).as_bytes().ct_eq(stored.as_bytes())))
}
