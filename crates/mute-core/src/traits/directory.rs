//! External collaborators: the member/role directory and guild configuration

use async_trait::async_trait;

use crate::entities::GuildMuteConfig;
use crate::error::DirectoryError;
use crate::traits::RepoResult;
use crate::value_objects::Snowflake;

/// Result type for directory calls
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// A role currently held by a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeldRole {
    pub role_id: Snowflake,
    /// Implicit role every member holds (`@everyone`)
    pub is_default: bool,
}

impl HeldRole {
    pub const fn new(role_id: Snowflake) -> Self {
        Self {
            role_id,
            is_default: false,
        }
    }

    pub const fn default_role(role_id: Snowflake) -> Self {
        Self {
            role_id,
            is_default: true,
        }
    }
}

/// Live member/role directory
///
/// Grant and revoke must be idempotent: granting a held role or revoking an
/// absent one succeeds without effect.
#[async_trait]
pub trait PrivilegeDirectory: Send + Sync {
    /// Give a role to a member
    async fn grant_role(&self, guild_id: Snowflake, user_id: Snowflake, role_id: Snowflake) -> DirectoryResult<()>;

    /// Take a role away from a member
    async fn revoke_role(&self, guild_id: Snowflake, user_id: Snowflake, role_id: Snowflake) -> DirectoryResult<()>;

    /// Roles the member holds right now, default role included
    async fn current_roles(&self, guild_id: Snowflake, user_id: Snowflake) -> DirectoryResult<Vec<HeldRole>>;
}

/// Read-only guild configuration
#[async_trait]
pub trait MuteConfigProvider: Send + Sync {
    /// Mute settings for a guild, `None` if the guild never set up a mute role
    async fn mute_config(&self, guild_id: Snowflake) -> RepoResult<Option<GuildMuteConfig>>;
}
