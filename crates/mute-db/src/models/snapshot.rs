//! Privilege snapshot database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for privilege_snapshots table
#[derive(Debug, Clone, FromRow)]
pub struct SnapshotModel {
    pub guild_id: i64,
    pub user_id: i64,
    pub role_ids: Vec<i64>,
    pub captured_at: DateTime<Utc>,
}
