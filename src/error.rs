//! Two-layer error design: [`ServiceError`] for business logic and
//! [`AppError`] for the HTTP surface.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{state::machine::InvalidTransition, store::document::StoreError};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The store failed mid-operation.
    #[error("store unavailable")]
    Unavailable(#[source] StoreError),
    /// Application is running in degraded mode without a store.
    #[error("store unavailable (degraded mode)")]
    Degraded,
    /// Unauthorized access attempt.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// A command's precondition does not hold (wrong phase, zero questions).
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),
    /// Duplicate submission for a question; a benign race outcome.
    #[error("question {question_number} was already answered")]
    AlreadyAnswered {
        /// The question the duplicate submission targeted.
        question_number: u32,
    },
    /// Malformed input (question content, answer labels).
    #[error("validation failed: {0}")]
    ValidationFailed(String),
    /// Requested session/question/participant does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// Store-level unique-key collision outside the ledger path.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { collection, id } => {
                ServiceError::NotFound(format!("document `{id}` in `{collection}`"))
            }
            StoreError::Conflict { collection, key } => {
                ServiceError::Conflict(format!("key `{key}` already exists in `{collection}`"))
            }
            other => ServiceError::Unavailable(other),
        }
    }
}

impl From<InvalidTransition> for ServiceError {
    fn from(err: InvalidTransition) -> Self {
        ServiceError::PreconditionFailed(err.to_string())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Unauthorized access attempt.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
            ServiceError::Unauthorized(message) => AppError::Unauthorized(message),
            ServiceError::PreconditionFailed(message) => AppError::Conflict(message),
            already @ ServiceError::AlreadyAnswered { .. } => {
                AppError::Conflict(already.to_string())
            }
            ServiceError::ValidationFailed(message) => AppError::BadRequest(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Conflict(message) => AppError::Conflict(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
