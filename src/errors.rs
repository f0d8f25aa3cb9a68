use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::config::ConfigError;

/// Failures surfaced to API clients.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: String },

    /// Storage unavailable or the operation timed out. Safe to retry.
    #[error("service temporarily unavailable: {0}")]
    Transient(String),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        AppError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            AppError::Validation { field, message } => {
                tracing::debug!(field, "rejected request: {message}");
                json!({
                    "status": "error",
                    "message": message,
                    "field": field,
                })
            }
            AppError::NotFound { entity, id } => {
                tracing::warn!(entity, id = %id, "record not found");
                json!({
                    "status": "error",
                    "message": self.to_string(),
                })
            }
            AppError::Transient(reason) => {
                tracing::warn!("transient failure: {reason}");
                json!({
                    "status": "error",
                    "message": "Service temporarily unavailable, please retry.",
                })
            }
            // Internal details stay in the log.
            AppError::Unexpected(reason) => {
                tracing::error!("unexpected failure: {reason}");
                json!({
                    "status": "error",
                    "message": "Internal server error.",
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(reason) => AppError::Transient(reason),
            StoreError::Corrupt(reason) => AppError::Unexpected(reason),
        }
    }
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        AppError::Transient("operation timed out".to_string())
    }
}

/// Failures raised by storage adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached; nothing was written.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store answered but the data or query was not usable.
    #[error("store failure: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => StoreError::Unavailable(err.to_string()),
            other => StoreError::Corrupt(other.to_string()),
        }
    }
}

/// Failures that stop the server from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
