//! PostgreSQL implementation of SnapshotRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use mute_core::entities::PrivilegeSnapshot;
use mute_core::traits::{RepoResult, SnapshotRepository};
use mute_core::value_objects::Snowflake;

use crate::mappers::SnapshotInsert;
use crate::models::SnapshotModel;

use super::error::map_db_error;

/// PostgreSQL implementation of SnapshotRepository
#[derive(Clone)]
pub struct PgSnapshotRepository {
    pool: PgPool,
}

impl PgSnapshotRepository {
    /// Create a new PgSnapshotRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SnapshotRepository for PgSnapshotRepository {
    #[instrument(skip(self))]
    async fn find(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<Option<PrivilegeSnapshot>> {
        let result = sqlx::query_as::<_, SnapshotModel>(
            r"
            SELECT guild_id, user_id, role_ids, captured_at
            FROM privilege_snapshots
            WHERE guild_id = $1 AND user_id = $2
            ",
        )
        .bind(guild_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(PrivilegeSnapshot::from))
    }

    #[instrument(skip(self, snapshot), fields(guild_id = %snapshot.guild_id, user_id = %snapshot.user_id))]
    async fn put(&self, snapshot: &PrivilegeSnapshot) -> RepoResult<()> {
        let insert = SnapshotInsert::new(snapshot);

        sqlx::query(
            r"
            INSERT INTO privilege_snapshots (guild_id, user_id, role_ids, captured_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (guild_id, user_id)
            DO UPDATE SET role_ids = EXCLUDED.role_ids, captured_at = EXCLUDED.captured_at
            ",
        )
        .bind(insert.guild_id)
        .bind(insert.user_id)
        .bind(&insert.role_ids)
        .bind(snapshot.captured_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM privilege_snapshots WHERE guild_id = $1 AND user_id = $2
            ",
        )
        .bind(guild_id.into_inner())
        .bind(user_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
