//! Service layer error types
//!
//! Provides a unified error type for all sanction operations.

use mute_common::AppError;
use mute_core::DomainError;
use std::fmt;

/// Service layer error type
#[derive(Debug)]
pub enum ServiceError {
    /// Domain rule violation or adapter failure
    Domain(DomainError),

    /// Application error
    App(AppError),

    /// Validation error
    Validation(String),

    /// Internal error
    Internal(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "{e}"),
            Self::App(e) => write!(f, "{e}"),
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            Self::App(e) => Some(e),
            _ => None,
        }
    }
}

impl ServiceError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the error code for boundary responses
    pub fn error_code(&self) -> &str {
        match self {
            Self::Domain(e) => e.code(),
            Self::App(e) => e.error_code(),
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// The key had no active sanction
    pub fn is_not_sanctioned(&self) -> bool {
        matches!(self, Self::Domain(DomainError::NotSanctioned))
    }

    /// Borrow the wrapped domain error, if any
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<AppError> for ServiceError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            ServiceError::App(e) => e,
            ServiceError::Validation(msg) => AppError::Validation(msg),
            ServiceError::Internal(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use mute_core::{DirectoryError, PrivilegeFailure, Snowflake};

    #[test]
    fn test_domain_error_code() {
        let err = ServiceError::from(DomainError::AlreadySanctioned);
        assert_eq!(err.error_code(), "ALREADY_SANCTIONED");
        assert!(!err.is_not_sanctioned());
        assert!(ServiceError::from(DomainError::NotSanctioned).is_not_sanctioned());
    }

    #[test]
    fn test_partial_restore_message() {
        let err = ServiceError::from(DomainError::PartialRestoreFailure {
            failed: vec![PrivilegeFailure::new(Snowflake::new(7), DirectoryError::Forbidden)],
        });
        assert_eq!(err.to_string(), "Failed to restore 1 role(s): role 7 (forbidden)");
    }

    #[test]
    fn test_convert_to_app_error() {
        let app_err: AppError = ServiceError::validation("directory is required").into();
        assert_eq!(app_err.error_code(), "VALIDATION_ERROR");

        let app_err: AppError = ServiceError::from(DomainError::MissingMuteRole).into();
        assert!(app_err.is_caller_error());
    }
}
