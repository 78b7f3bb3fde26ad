//! Guild mute configuration - which role marks a member as muted

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Per-guild mute settings, owned by external configuration management
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildMuteConfig {
    pub guild_id: Snowflake,
    pub mute_role_id: Snowflake,
}

impl GuildMuteConfig {
    pub fn new(guild_id: Snowflake, mute_role_id: Snowflake) -> Self {
        Self {
            guild_id,
            mute_role_id,
        }
    }
}
