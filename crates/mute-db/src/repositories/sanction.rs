//! PostgreSQL implementation of SanctionRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use mute_core::entities::SanctionRecord;
use mute_core::error::DomainError;
use mute_core::traits::{RepoResult, SanctionRepository};
use mute_core::value_objects::Snowflake;

use crate::mappers::SanctionInsert;
use crate::models::SanctionModel;

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of SanctionRepository
#[derive(Clone)]
pub struct PgSanctionRepository {
    pool: PgPool,
}

impl PgSanctionRepository {
    /// Create a new PgSanctionRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_records(rows: Vec<SanctionModel>) -> RepoResult<Vec<SanctionRecord>> {
    rows.into_iter().map(SanctionRecord::try_from).collect()
}

#[async_trait]
impl SanctionRepository for PgSanctionRepository {
    #[instrument(skip(self))]
    async fn find(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<Option<SanctionRecord>> {
        let result = sqlx::query_as::<_, SanctionModel>(
            r"
            SELECT guild_id, user_id, applied_by, applied_at, duration_secs, variant
            FROM active_sanctions
            WHERE guild_id = $1 AND user_id = $2
            ",
        )
        .bind(guild_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(SanctionRecord::try_from).transpose()
    }

    #[instrument(skip(self, record), fields(guild_id = %record.guild_id, user_id = %record.user_id))]
    async fn create(&self, record: &SanctionRecord) -> RepoResult<()> {
        let insert = SanctionInsert::new(record);

        sqlx::query(
            r"
            INSERT INTO active_sanctions (guild_id, user_id, applied_by, applied_at, duration_secs, variant)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(insert.guild_id)
        .bind(insert.user_id)
        .bind(insert.applied_by)
        .bind(record.applied_at)
        .bind(insert.duration_secs)
        .bind(insert.variant)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::AlreadySanctioned))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM active_sanctions WHERE guild_id = $1 AND user_id = $2
            ",
        )
        .bind(guild_id.into_inner())
        .bind(user_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> RepoResult<Vec<SanctionRecord>> {
        let rows = sqlx::query_as::<_, SanctionModel>(
            r"
            SELECT guild_id, user_id, applied_by, applied_at, duration_secs, variant
            FROM active_sanctions
            ORDER BY applied_at ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        into_records(rows)
    }

    #[instrument(skip(self))]
    async fn list_by_guild(&self, guild_id: Snowflake) -> RepoResult<Vec<SanctionRecord>> {
        let rows = sqlx::query_as::<_, SanctionModel>(
            r"
            SELECT guild_id, user_id, applied_by, applied_at, duration_secs, variant
            FROM active_sanctions
            WHERE guild_id = $1
            ORDER BY applied_at ASC
            ",
        )
        .bind(guild_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        into_records(rows)
    }
}
