//! Error handling middleware - RFC 7807 compliant responses.
//!
//! Maps the domain taxonomy (validation / authorization / not-found) onto
//! HTTP statuses. Repository internals are logged, never leaked.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use gflab_shared::ErrorResponse;
use std::fmt;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Unauthorized,
    Forbidden(String),
    Conflict(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Unauthorized => write!(f, "Unauthorized"),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::Unauthorized => ErrorResponse::unauthorized(),
            AppError::Forbidden(detail) => ErrorResponse::forbidden().with_detail(detail),
            AppError::Conflict(detail) => ErrorResponse::new(409, "Conflict").with_detail(detail),
            AppError::Internal(detail) => {
                // Log internal errors
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

// Conversion from domain errors
impl From<gflab_core::error::DomainError> for AppError {
    fn from(err: gflab_core::error::DomainError) -> Self {
        use gflab_core::error::DomainError;
        match err {
            DomainError::NotFound(what) => AppError::NotFound(format!("{} not found", what)),
            DomainError::Validation(msg) => AppError::BadRequest(msg),
            DomainError::Forbidden(msg) => AppError::Forbidden(msg),
            DomainError::Unauthorized => AppError::Unauthorized,
            DomainError::Duplicate(msg) => AppError::Conflict(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<gflab_core::error::RepoError> for AppError {
    fn from(err: gflab_core::error::RepoError) -> Self {
        use gflab_core::error::RepoError;
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => AppError::Conflict(msg),
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<gflab_core::ports::AuthError> for AppError {
    fn from(err: gflab_core::ports::AuthError) -> Self {
        use gflab_core::ports::AuthError;
        match err {
            AuthError::InsufficientPermissions => {
                AppError::Forbidden("Insufficient permissions".to_string())
            }
            AuthError::HashingError(msg) => AppError::Internal(msg),
            AuthError::InvalidCredentials
            | AuthError::TokenExpired
            | AuthError::InvalidToken(_)
            | AuthError::MissingAuth => AppError::Unauthorized,
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
