//! Active sanction database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for active_sanctions table
#[derive(Debug, Clone, FromRow)]
pub struct SanctionModel {
    pub guild_id: i64,
    pub user_id: i64,
    pub applied_by: i64,
    pub applied_at: DateTime<Utc>,
    /// NULL for indefinite sanctions
    pub duration_secs: Option<i64>,
    pub variant: String,
}
