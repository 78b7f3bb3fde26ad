//! PrivilegeSnapshot entity <-> model mapper

use mute_core::entities::PrivilegeSnapshot;
use mute_core::value_objects::Snowflake;

use crate::models::SnapshotModel;

impl From<SnapshotModel> for PrivilegeSnapshot {
    fn from(model: SnapshotModel) -> Self {
        PrivilegeSnapshot {
            guild_id: Snowflake::new(model.guild_id),
            user_id: Snowflake::new(model.user_id),
            role_ids: model.role_ids.into_iter().map(Snowflake::new).collect(),
            captured_at: model.captured_at,
        }
    }
}

/// Snapshot values ready for upsert
pub struct SnapshotInsert {
    pub guild_id: i64,
    pub user_id: i64,
    pub role_ids: Vec<i64>,
}

impl SnapshotInsert {
    pub fn new(snapshot: &PrivilegeSnapshot) -> Self {
        Self {
            guild_id: snapshot.guild_id.into_inner(),
            user_id: snapshot.user_id.into_inner(),
            role_ids: snapshot.role_ids.iter().map(|id| id.into_inner()).collect(),
        }
    }
}
