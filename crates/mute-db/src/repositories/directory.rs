//! PostgreSQL implementation of PrivilegeDirectory
//!
//! Reads and writes the host's `guild_members`, `roles` and `member_roles`
//! tables. The `@everyone` role is never stored in `member_roles`; it is
//! reported as the member's default role.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use mute_core::error::DirectoryError;
use mute_core::traits::{DirectoryResult, HeldRole, PrivilegeDirectory};
use mute_core::value_objects::Snowflake;

use crate::models::HeldRoleModel;

use super::error::map_directory_error;

/// PostgreSQL implementation of PrivilegeDirectory
#[derive(Clone)]
pub struct PgPrivilegeDirectory {
    pool: PgPool,
}

impl PgPrivilegeDirectory {
    /// Create a new PgPrivilegeDirectory
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ensure_member(&self, guild_id: Snowflake, user_id: Snowflake) -> DirectoryResult<()> {
        let exists = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(SELECT 1 FROM guild_members WHERE guild_id = $1 AND user_id = $2)
            ",
        )
        .bind(guild_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_directory_error)?;

        if exists {
            Ok(())
        } else {
            Err(DirectoryError::NotFound)
        }
    }

    /// Whether the role is the guild's default role, `NotFound` if it does not exist
    async fn role_is_default(&self, guild_id: Snowflake, role_id: Snowflake) -> DirectoryResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r"
            SELECT is_everyone FROM roles
            WHERE id = $1 AND guild_id = $2 AND deleted_at IS NULL
            ",
        )
        .bind(role_id.into_inner())
        .bind(guild_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_directory_error)?
        .ok_or(DirectoryError::NotFound)
    }
}

#[async_trait]
impl PrivilegeDirectory for PgPrivilegeDirectory {
    #[instrument(skip(self))]
    async fn grant_role(&self, guild_id: Snowflake, user_id: Snowflake, role_id: Snowflake) -> DirectoryResult<()> {
        self.ensure_member(guild_id, user_id).await?;
        if self.role_is_default(guild_id, role_id).await? {
            debug!("Default role is implicit, nothing to grant");
            return Ok(());
        }

        sqlx::query(
            r"
            INSERT INTO member_roles (guild_id, user_id, role_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (guild_id, user_id, role_id) DO NOTHING
            ",
        )
        .bind(guild_id.into_inner())
        .bind(user_id.into_inner())
        .bind(role_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_directory_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn revoke_role(&self, guild_id: Snowflake, user_id: Snowflake, role_id: Snowflake) -> DirectoryResult<()> {
        self.ensure_member(guild_id, user_id).await?;
        if self.role_is_default(guild_id, role_id).await? {
            // @everyone cannot be taken away
            return Err(DirectoryError::Forbidden);
        }

        sqlx::query(
            r"
            DELETE FROM member_roles WHERE guild_id = $1 AND user_id = $2 AND role_id = $3
            ",
        )
        .bind(guild_id.into_inner())
        .bind(user_id.into_inner())
        .bind(role_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_directory_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn current_roles(&self, guild_id: Snowflake, user_id: Snowflake) -> DirectoryResult<Vec<HeldRole>> {
        self.ensure_member(guild_id, user_id).await?;

        let rows = sqlx::query_as::<_, HeldRoleModel>(
            r"
            SELECT r.id AS role_id, r.is_everyone AS is_default
            FROM roles r
            WHERE r.guild_id = $1
              AND r.deleted_at IS NULL
              AND (
                  r.is_everyone
                  OR r.id IN (SELECT role_id FROM member_roles WHERE guild_id = $1 AND user_id = $2)
              )
            ORDER BY r.position ASC, r.id ASC
            ",
        )
        .bind(guild_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_directory_error)?;

        Ok(rows
            .into_iter()
            .map(|row| HeldRole {
                role_id: Snowflake::new(row.role_id),
                is_default: row.is_default,
            })
            .collect())
    }
}
