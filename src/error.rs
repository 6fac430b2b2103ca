//! Error types shared by repositories, services and handlers.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::response::{ApiResponse, ErrorBody};

/// Failure of a single repository statement.
#[derive(Debug, Error)]
pub enum RepoError {
    /// A unique constraint rejected the write.
    #[error("duplicate record")]
    Duplicate,

    /// The database could not be reached.
    #[error("database unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => RepoError::Duplicate,
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => RepoError::Unavailable(e),
            _ => RepoError::Database(e),
        }
    }
}

/// Field-level problem reported inside a validation failure.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorDetail {
    pub path: String,
    pub value: String,
    pub message: String,
}

impl ErrorDetail {
    pub fn required(path: &str) -> Self {
        Self {
            path: path.to_string(),
            value: String::new(),
            message: format!("{path} is required"),
        }
    }

    pub fn new(path: &str, value: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            value: value.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Validation {
        message: String,
        details: Vec<ErrorDetail>,
    },

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Auth(String),

    #[error("{0}")]
    NotFound(String),

    /// Datastore or network failure worth retrying.
    #[error("{0}")]
    Transient(String),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>, details: Vec<ErrorDetail>) -> Self {
        AppError::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Transient(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub const TRY_AGAIN: &str = "something went wrong, please wait and try again";

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Duplicate => AppError::Conflict("duplicate record".into()),
            RepoError::Unavailable(source) => {
                error!(error = %source, "database unavailable");
                AppError::Transient(TRY_AGAIN.into())
            }
            RepoError::Database(source) => AppError::Internal(source.into()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::validation(rejection.body_text(), Vec::new())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Validation { message, details } => ErrorBody {
                message,
                details: Some(details),
            },
            AppError::Internal(e) => {
                error!(error = %e, "internal error");
                ErrorBody {
                    message: "internal server error".into(),
                    details: None,
                }
            }
            other => ErrorBody {
                message: other.to_string(),
                details: None,
            },
        };
        ApiResponse::<()>::fail(status, body).into_response()
    }
}
