//! Privilege snapshot - roles held by a member right before a hard mute

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::SanctionKey;
use crate::value_objects::Snowflake;

/// Roles to restore when a hard sanction is reversed
///
/// Exists if and only if a hard `SanctionRecord` exists for the same key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivilegeSnapshot {
    pub guild_id: Snowflake,
    pub user_id: Snowflake,
    /// Ordered, without duplicates and without the default role
    pub role_ids: Vec<Snowflake>,
    pub captured_at: DateTime<Utc>,
}

impl PrivilegeSnapshot {
    /// Create a snapshot, dropping duplicate role IDs while keeping order
    pub fn new(key: SanctionKey, role_ids: Vec<Snowflake>, captured_at: DateTime<Utc>) -> Self {
        let mut ordered = Vec::with_capacity(role_ids.len());
        for role_id in role_ids {
            if !ordered.contains(&role_id) {
                ordered.push(role_id);
            }
        }

        Self {
            guild_id: key.guild_id,
            user_id: key.user_id,
            role_ids: ordered,
            captured_at,
        }
    }

    #[inline]
    pub fn key(&self) -> SanctionKey {
        SanctionKey::new(self.guild_id, self.user_id)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.role_ids.is_empty()
    }

    #[inline]
    pub fn contains(&self, role_id: Snowflake) -> bool {
        self.role_ids.contains(&role_id)
    }
}
