//! Schema bootstrap for the sanction tables

use sqlx::PgPool;
use tracing::info;

const SCHEMA: &str = include_str!("../../sql/schema.sql");

/// Create the sanction tables if they do not exist yet
///
/// Safe to run on every start.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    info!("Sanction schema ready");
    Ok(())
}
