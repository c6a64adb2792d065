use thiserror::Error;

use crate::repository::{RepositoryError, ValueError};

/// Failures raised while translating between representations and repository items
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BindingError {
    #[error("Unknown property type '{type_name}' for property '{property}'")]
    UnknownType { property: String, type_name: String },

    #[error("Property '{0}' is single-valued but no value was supplied")]
    MissingValue(String),

    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Invalid value for property '{property}': {source}")]
    InvalidValue {
        property: String,
        #[source]
        source: ValueError,
    },

    #[error("Cannot decode binary value of property '{property}': {reason}")]
    Encoding { property: String, reason: String },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl BindingError {
    pub(crate) fn from_value_error(property: &str, error: ValueError) -> Self {
        match error {
            ValueError::InvalidBase64(reason) => BindingError::Encoding {
                property: property.to_string(),
                reason,
            },
            other => BindingError::InvalidValue {
                property: property.to_string(),
                source: other,
            },
        }
    }
}
