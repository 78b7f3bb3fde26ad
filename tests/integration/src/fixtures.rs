//! Test fixtures and data generators
//!
//! Provides reusable IDs and guild layouts for integration tests.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use mute_core::{GuildMuteConfig, MuteDuration, Snowflake};

/// Counter for unique test IDs
static COUNTER: AtomicI64 = AtomicI64::new(1_000);

/// Get a unique Snowflake for test data
pub fn unique_id() -> Snowflake {
    Snowflake::new(COUNTER.fetch_add(1, Ordering::SeqCst))
}

/// The identity the engine runs as
pub const SYSTEM_USER: Snowflake = Snowflake::new(1);

/// Fixed start of every test clock
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Shorthand for a timed sanction
pub fn minutes(n: u64) -> Option<MuteDuration> {
    MuteDuration::from_secs(n * 60).ok()
}

pub fn seconds(n: u64) -> Option<MuteDuration> {
    MuteDuration::from_secs(n).ok()
}

/// A guild with a mute role, a moderator and two ordinary roles
#[derive(Debug, Clone, Copy)]
pub struct GuildFixture {
    pub guild_id: Snowflake,
    /// `@everyone`, shares the guild's id
    pub everyone: Snowflake,
    pub mute_role: Snowflake,
    pub moderator: Snowflake,
    pub role_a: Snowflake,
    pub role_b: Snowflake,
}

impl GuildFixture {
    pub fn unique() -> Self {
        let guild_id = unique_id();
        Self {
            guild_id,
            everyone: guild_id,
            mute_role: unique_id(),
            moderator: unique_id(),
            role_a: unique_id(),
            role_b: unique_id(),
        }
    }

    pub fn mute_config(&self) -> GuildMuteConfig {
        GuildMuteConfig::new(self.guild_id, self.mute_role)
    }
}
