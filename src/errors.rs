use thiserror::Error;

use crate::schema::FieldType;

pub type Result<T> = std::result::Result<T, DatastoreError>;

#[derive(Debug, Error)]
pub enum DatastoreError {
    #[error("Failed to configure datastore: {0}")]
    ConfigError(String),

    #[error("Misconfigured dataset, parameter dataset is required")]
    MisconfiguredDataset,

    #[error("Failed to convert field {field} to {expected}: {reason}")]
    FieldConversion {
        field: String,
        expected: FieldType,
        reason: String,
    },

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid field member name: {0}")]
    InvalidMember(String),

    #[error("Failed to authenticate with the datastore: {0}")]
    AuthError(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Datastore API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to (de)serialize payload: {0}")]
    SerializationError(String),
}

impl DatastoreError {
    pub fn missing_parameter(name: &str) -> Self {
        DatastoreError::ConfigError(format!(
            "Parameter \"{name}\" is required to initialize service"
        ))
    }

    pub fn conversion(field: &str, expected: FieldType, reason: impl Into<String>) -> Self {
        DatastoreError::FieldConversion {
            field: field.to_string(),
            expected,
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for DatastoreError {
    fn from(error: reqwest::Error) -> Self {
        DatastoreError::HttpError(error.to_string())
    }
}

impl From<serde_json::Error> for DatastoreError {
    fn from(error: serde_json::Error) -> Self {
        DatastoreError::SerializationError(error.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for DatastoreError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        DatastoreError::AuthError(error.to_string())
    }
}

impl From<anyhow::Error> for DatastoreError {
    fn from(error: anyhow::Error) -> Self {
        DatastoreError::ApiError {
            status: 0,
            message: error.to_string(),
        }
    }
}
