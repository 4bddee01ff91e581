use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// A deserialization failure with the JSON path where it happened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("at JSON path {path} → {message}")]
pub struct PathError {
    pub path: String,
    pub message: String,
}

/// Deserialize with JSON-path context in error messages.
pub fn from_value_with_path<T: DeserializeOwned>(value: &Value) -> Result<T, PathError> {
    serde_path_to_error::deserialize::<_, T>(value).map_err(|err| PathError {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}
