//! Error handling for the CardioGuard service.
//!
//! Every failure is terminal for the request that triggered it: there is no
//! retry, no fallback model, and no transient/permanent distinction.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Main error type for the CardioGuard service
#[derive(Error, Debug)]
pub enum CardioError {
    #[error("Invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },

    #[error("Schema error: {message}")]
    Schema { message: String },

    #[error("Failed to load model '{name}': {message}")]
    ModelLoad { name: String, message: String },

    #[error("Inference failed for model '{model}': {message}")]
    Inference { model: String, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Resource not found: {resource} - {id}")]
    NotFound { resource: String, id: String },

    #[error("I/O operation failed: {operation}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Type alias for Result with CardioError
pub type CardioResult<T> = Result<T, CardioError>;

impl CardioError {
    /// Create an invalid-input error for a named record field
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a bulk-upload schema error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Create a model load error (startup-fatal)
    pub fn model_load(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ModelLoad {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an inference error
    pub fn inference(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Inference {
            model: model.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Create a serialization error
    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }
}

#[derive(Serialize)]
struct ErrBody {
    error: String,
}

impl IntoResponse for CardioError {
    fn into_response(self) -> Response {
        let status = match self {
            CardioError::InvalidInput { .. } | CardioError::Schema { .. } => {
                StatusCode::BAD_REQUEST
            }
            CardioError::NotFound { .. } => StatusCode::NOT_FOUND,
            // ModelLoad and Config abort startup and should never reach a
            // handler; mapped with the other server-side failures.
            CardioError::ModelLoad { .. }
            | CardioError::Inference { .. }
            | CardioError::Config { .. }
            | CardioError::Io { .. }
            | CardioError::Serialization { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (
            status,
            Json(ErrBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<serde_json::Error> for CardioError {
    fn from(err: serde_json::Error) -> Self {
        CardioError::serialization("json_operation", err)
    }
}

impl From<std::io::Error> for CardioError {
    fn from(err: std::io::Error) -> Self {
        CardioError::io("io_operation", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let input_err = CardioError::invalid_input("Sex", "unknown value 'Other'");
        assert!(input_err.to_string().contains("Invalid input"));
        assert!(input_err.to_string().contains("Sex"));

        let load_err = CardioError::model_load("Random Forest", "file missing");
        assert!(load_err.to_string().contains("Random Forest"));
    }

    #[test]
    fn test_error_chaining() {
        use std::error::Error;

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let cardio_err = CardioError::io("reading model artifact", io_err);

        assert!(cardio_err.source().is_some());
        assert!(cardio_err.to_string().contains("I/O operation failed"));
    }
}
