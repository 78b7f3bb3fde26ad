//! Application error types
//!
//! Unified error handling for the worker and any caller embedding the engine.

use mute_core::DomainError;
use std::fmt;

use crate::config::ConfigError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    // Resource errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // Storage errors
    #[error("Database error: {0}")]
    Database(String),

    // Member/role directory errors
    #[error("Directory error: {0}")]
    Directory(String),

    // Internal errors
    #[error("Internal error")]
    Internal(#[source] anyhow::Error),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Get error code for boundary responses
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Directory(_) => "DIRECTORY_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Domain(e) => e.code(),
        }
    }

    /// Whether the caller can fix the problem (bad input, wrong state, guild setup)
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        match self {
            Self::Validation(_) | Self::NotFound(_) | Self::Conflict(_) => true,
            Self::Database(_) | Self::Directory(_) | Self::Internal(_) | Self::Config(_) => false,
            Self::Domain(e) => {
                e.is_not_found()
                    || e.is_validation()
                    || e.is_conflict()
                    || e.is_authorization()
                    || e.is_configuration()
                    || matches!(e, DomainError::PartialRestoreFailure { .. })
            }
        }
    }

    /// Create a not found error for a resource type
    #[must_use]
    pub fn not_found(resource: impl fmt::Display) -> Self {
        Self::NotFound(resource.to_string())
    }

    /// Create a validation error
    #[must_use]
    pub fn validation(msg: impl fmt::Display) -> Self {
        Self::Validation(msg.to_string())
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
