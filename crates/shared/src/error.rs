//! Application-wide error type.
//!
//! Domain and repository errors convert into `AppError` so that whatever layer
//! sits in front of the repositories can map a rejected write to a status code
//! without knowing the domain enums.

use thiserror::Error;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Input failed validation before anything was written.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Input was well-formed but violates a budget rule.
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Write would duplicate a unique name.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Storage failure; the whole write was rolled back.
    #[error("Database error: {0}")]
    Database(String),

    /// A lower layer failed in a way the caller cannot fix.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code a request layer should answer with.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::BusinessRule(_) => 422,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the stable machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BusinessRule(_) => "BUSINESS_RULE_VIOLATION",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
