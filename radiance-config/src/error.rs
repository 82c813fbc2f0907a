//! Error types for method registration, lookup and override resolution.

use thiserror::Error;

/// Errors raised while registering, resolving or persisting method configs.
///
/// Every variant is a local validation failure: nothing here is retried, the
/// caller is expected to abort before any training resources are allocated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Method '{0}' is already registered")]
    DuplicateKey(String),

    #[error("Unknown method '{name}' (available: {})", .available.join(", "))]
    UnknownMethod { name: String, available: Vec<String> },

    #[error("Unknown field '{path}'")]
    UnknownField { path: String },

    #[error("Type mismatch at '{path}': expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    #[error("Field '{field}' can only be replaced as a whole value (override targeted '{path}')")]
    WholeValueOnly { path: String, field: String },

    #[error("Registration key '{key}' does not match method name '{method_name}'")]
    NameMismatch { key: String, method_name: String },

    #[error("Unknown {category} '{name}'")]
    UnknownKind { category: &'static str, name: String },

    #[error("Invalid override '{0}': expected PATH=VALUE")]
    InvalidOverride(String),

    #[error("Invalid value at '{path}': {reason}")]
    InvalidValue { path: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn unknown_field(path: impl ToString) -> Self {
        ConfigError::UnknownField {
            path: path.to_string(),
        }
    }

    pub(crate) fn invalid_value(path: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}
