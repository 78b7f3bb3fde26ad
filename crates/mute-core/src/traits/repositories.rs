//! Repository traits (ports) - durable keyed storage for sanction state
//!
//! Both tables are keyed by `(guild_id, user_id)`. The infrastructure layer
//! provides PostgreSQL and in-memory implementations.

use async_trait::async_trait;

use crate::entities::{PrivilegeSnapshot, SanctionRecord};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Sanction Repository
// ============================================================================

#[async_trait]
pub trait SanctionRepository: Send + Sync {
    /// Find the active sanction for a member
    async fn find(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<Option<SanctionRecord>>;

    /// Persist a new record
    ///
    /// Fails with `DomainError::AlreadySanctioned` if one already exists for the key.
    async fn create(&self, record: &SanctionRecord) -> RepoResult<()>;

    /// Delete the record, returning whether one was removed
    async fn delete(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<bool>;

    /// Copy of every active record across all guilds
    async fn list_all(&self) -> RepoResult<Vec<SanctionRecord>>;

    /// Active records for one guild
    async fn list_by_guild(&self, guild_id: Snowflake) -> RepoResult<Vec<SanctionRecord>>;
}

// ============================================================================
// Snapshot Repository
// ============================================================================

#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Find the snapshot taken for a hard-muted member
    async fn find(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<Option<PrivilegeSnapshot>>;

    /// Insert or replace the snapshot for the key
    async fn put(&self, snapshot: &PrivilegeSnapshot) -> RepoResult<()>;

    /// Delete the snapshot, returning whether one was removed
    async fn delete(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<bool>;
}
