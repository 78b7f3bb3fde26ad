//! Error handling utilities for repositories

use mute_core::error::{DirectoryError, DomainError};
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Check for unique violation and return appropriate error or fallback
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique();
        }
    }
    DomainError::DatabaseError(e.to_string())
}

/// Convert SQLx error to a directory failure
///
/// Storage trouble is transient from the caller's point of view.
pub fn map_directory_error(e: SqlxError) -> DirectoryError {
    DirectoryError::Unavailable(e.to_string())
}
