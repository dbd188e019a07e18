/// Structured error types for rowkeep-core.
///
/// Uses `thiserror` so the server crate can match on variants when mapping
/// decode failures to HTTP responses. The binary still wraps these in
/// `anyhow` for startup errors.
use std::path::PathBuf;
use thiserror::Error;

use crate::schema::FieldKind;

/// Main error type for schema, decoding and configuration
#[derive(Error, Debug)]
pub enum CoreError {
    /// Schema descriptor is inconsistent
    #[error("Invalid schema for '{collection}': {reason}")]
    InvalidSchema { collection: String, reason: String },

    /// Name cannot be used as a SQL identifier
    #[error("Invalid identifier '{value}': must match [A-Za-z_][A-Za-z0-9_]* and be at most 63 characters")]
    InvalidIdentifier { value: String },

    /// Body value could not be coerced to the field's kind
    #[error("Field '{field}' expects {expected}, got {found}")]
    Coercion {
        field: String,
        expected: FieldKind,
        found: String,
    },

    /// Path key could not be coerced to the identity kind
    #[error("Key '{raw}' is not a valid {expected}")]
    InvalidKey { raw: String, expected: FieldKind },

    /// Request body was not a JSON object
    #[error("Request body must be a JSON object, got {found}")]
    NotAnObject { found: String },

    /// Configuration file could not be read
    #[error("Failed to read config {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Configuration is syntactically or semantically wrong
    #[error("Configuration error: {reason}")]
    Config { reason: String },
}

/// Result type alias for rowkeep-core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Create an invalid schema error
    pub fn invalid_schema(collection: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSchema {
            collection: collection.into(),
            reason: reason.into(),
        }
    }

    /// Create a coercion error, describing the offending JSON value
    pub fn coercion(field: impl Into<String>, expected: FieldKind, found: &serde_json::Value) -> Self {
        Self::Coercion {
            field: field.into(),
            expected,
            found: describe_json(found),
        }
    }

    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}

/// Short human description of a JSON value for error messages
pub(crate) fn describe_json(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "null".to_string(),
        serde_json::Value::Bool(b) => format!("boolean {}", b),
        serde_json::Value::Number(n) => format!("number {}", n),
        serde_json::Value::String(s) => format!("string \"{}\"", s),
        serde_json::Value::Array(_) => "an array".to_string(),
        serde_json::Value::Object(_) => "an object".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_display() {
        let err = CoreError::coercion("rating", FieldKind::Integer, &json!("high"));
        assert_eq!(
            err.to_string(),
            "Field 'rating' expects integer, got string \"high\""
        );

        let err = CoreError::invalid_schema("users", "no identity field");
        assert!(err.to_string().contains("users"));
        assert!(err.to_string().contains("no identity field"));
    }

    #[test]
    fn test_describe_containers() {
        assert_eq!(describe_json(&json!([1, 2])), "an array");
        assert_eq!(describe_json(&json!({"a": 1})), "an object");
        assert_eq!(describe_json(&json!(null)), "null");
    }
}
