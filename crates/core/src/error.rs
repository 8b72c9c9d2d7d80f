//! Error types for Paddock.
//!
//! This module defines a unified error enum that covers all error categories
//! in the application: configuration, I/O, LLM, fact store, query safety,
//! knowledge retrieval, prompts and serialization.

use thiserror::Error;

/// Unified error type for Paddock.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// Errors are represented and propagated, never panicked.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Structured dataset errors
    #[error("Fact store error: {0}")]
    Facts(String),

    /// A generated query was rejected by the read-only policy
    #[error("Unsafe query: {0}")]
    UnsafeQuery(String),

    /// Document index and retrieval errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Facts(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsafe_query_message() {
        let err = AppError::UnsafeQuery("Multiple statements not allowed.".to_string());
        assert_eq!(
            err.to_string(),
            "Unsafe query: Multiple statements not allowed."
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let parsed: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: AppError = parsed.unwrap_err().into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
