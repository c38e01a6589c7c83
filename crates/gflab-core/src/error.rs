//! Domain-level error types.

use thiserror::Error;

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not authorized: {0}")]
    Forbidden(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}
