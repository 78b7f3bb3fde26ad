//! Domain errors - error types for the domain layer

use std::fmt;

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Failure reported by the member/role directory
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// Member, guild or role could not be resolved
    #[error("not found")]
    NotFound,

    /// Insufficient rights to mutate the member's roles
    #[error("forbidden")]
    Forbidden,

    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

/// A single role that could not be revoked or re-granted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivilegeFailure {
    pub role_id: Snowflake,
    pub error: DirectoryError,
}

impl PrivilegeFailure {
    pub fn new(role_id: Snowflake, error: DirectoryError) -> Self {
        Self { role_id, error }
    }
}

impl fmt::Display for PrivilegeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "role {} ({})", self.role_id, self.error)
    }
}

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Member not found in guild")]
    MemberNotFound,

    #[error("Member is not sanctioned")]
    NotSanctioned,

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Cannot sanction yourself or the system user")]
    SelfOrSystemTarget,

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Missing rights to change member roles")]
    DirectoryForbidden,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Member is already sanctioned")]
    AlreadySanctioned,

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Guild has no mute role set up")]
    MissingMuteRole,

    #[error("Mute role is not configured for guild {0}")]
    MuteRoleUnconfigured(Snowflake),

    // =========================================================================
    // Partial Failures
    // =========================================================================
    #[error("Failed to restore {} role(s): {}", .failed.len(), join_failures(.failed))]
    PartialRestoreFailure { failed: Vec<PrivilegeFailure> },

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Directory unavailable: {0}")]
    DirectoryUnavailable(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

fn join_failures(failed: &[PrivilegeFailure]) -> String {
    failed
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl DomainError {
    /// Get an error code string for boundary responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::MemberNotFound => "UNKNOWN_MEMBER",
            Self::NotSanctioned => "NOT_SANCTIONED",
            Self::InvalidDuration(_) => "INVALID_DURATION",
            Self::SelfOrSystemTarget => "SELF_OR_SYSTEM_TARGET",
            Self::DirectoryForbidden => "DIRECTORY_FORBIDDEN",
            Self::AlreadySanctioned => "ALREADY_SANCTIONED",
            Self::MissingMuteRole => "MISSING_MUTE_ROLE",
            Self::MuteRoleUnconfigured(_) => "MUTE_ROLE_UNCONFIGURED",
            Self::PartialRestoreFailure { .. } => "PARTIAL_RESTORE_FAILURE",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::DirectoryUnavailable(_) => "DIRECTORY_UNAVAILABLE",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::MemberNotFound | Self::NotSanctioned)
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidDuration(_) | Self::SelfOrSystemTarget)
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::DirectoryForbidden)
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::AlreadySanctioned)
    }

    /// Check if this is a guild configuration problem
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingMuteRole | Self::MuteRoleUnconfigured(_))
    }
}

impl From<DirectoryError> for DomainError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::NotFound => Self::MemberNotFound,
            DirectoryError::Forbidden => Self::DirectoryForbidden,
            DirectoryError::Unavailable(msg) => Self::DirectoryUnavailable(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(DomainError::AlreadySanctioned.code(), "ALREADY_SANCTIONED");
        assert_eq!(DomainError::NotSanctioned.code(), "NOT_SANCTIONED");
        assert_eq!(
            DomainError::MuteRoleUnconfigured(Snowflake::new(1)).code(),
            "MUTE_ROLE_UNCONFIGURED"
        );
    }

    #[test]
    fn test_classifiers() {
        assert!(DomainError::NotSanctioned.is_not_found());
        assert!(DomainError::AlreadySanctioned.is_conflict());
        assert!(DomainError::SelfOrSystemTarget.is_validation());
        assert!(DomainError::DirectoryForbidden.is_authorization());
        assert!(DomainError::MissingMuteRole.is_configuration());
        assert!(!DomainError::DatabaseError("down".to_string()).is_not_found());
    }

    #[test]
    fn test_directory_error_conversion() {
        assert!(matches!(
            DomainError::from(DirectoryError::NotFound),
            DomainError::MemberNotFound
        ));
        assert!(matches!(
            DomainError::from(DirectoryError::Forbidden),
            DomainError::DirectoryForbidden
        ));
        assert!(matches!(
            DomainError::from(DirectoryError::Unavailable("timeout".to_string())),
            DomainError::DirectoryUnavailable(msg) if msg == "timeout"
        ));
    }

    #[test]
    fn test_partial_restore_display() {
        let err = DomainError::PartialRestoreFailure {
            failed: vec![
                PrivilegeFailure::new(Snowflake::new(10), DirectoryError::Forbidden),
                PrivilegeFailure::new(Snowflake::new(11), DirectoryError::NotFound),
            ],
        };
        assert_eq!(
            err.to_string(),
            "Failed to restore 2 role(s): role 10 (forbidden), role 11 (not found)"
        );
    }
}
