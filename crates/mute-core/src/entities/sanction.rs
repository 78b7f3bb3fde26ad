//! Sanction record - an active mute applied to a guild member

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{MuteDuration, Snowflake};

/// Identity of a sanction: at most one active record exists per key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SanctionKey {
    pub guild_id: Snowflake,
    pub user_id: Snowflake,
}

impl SanctionKey {
    #[inline]
    pub const fn new(guild_id: Snowflake, user_id: Snowflake) -> Self {
        Self { guild_id, user_id }
    }
}

impl fmt::Display for SanctionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.guild_id, self.user_id)
    }
}

/// How the sanction was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SanctionVariant {
    /// Mute role granted on top of the member's existing roles
    Soft,
    /// Every role stripped and snapshotted, mute role granted
    Hard,
}

impl SanctionVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Soft => "soft",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for SanctionVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SanctionVariant {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "soft" => Ok(Self::Soft),
            "hard" => Ok(Self::Hard),
            other => Err(DomainError::InternalError(format!(
                "unknown sanction variant '{other}'"
            ))),
        }
    }
}

/// Active sanction record
///
/// Records are never edited in place: they are created when a sanction is
/// applied and deleted when it is reversed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanctionRecord {
    pub guild_id: Snowflake,
    pub user_id: Snowflake,
    pub applied_by: Snowflake,
    pub applied_at: DateTime<Utc>,
    /// `None` means the sanction lasts until explicitly reversed
    pub duration: Option<MuteDuration>,
    pub variant: SanctionVariant,
}

impl SanctionRecord {
    /// Create a new SanctionRecord
    pub fn new(
        key: SanctionKey,
        applied_by: Snowflake,
        applied_at: DateTime<Utc>,
        duration: Option<MuteDuration>,
        variant: SanctionVariant,
    ) -> Self {
        Self {
            guild_id: key.guild_id,
            user_id: key.user_id,
            applied_by,
            applied_at,
            duration,
            variant,
        }
    }

    #[inline]
    pub fn key(&self) -> SanctionKey {
        SanctionKey::new(self.guild_id, self.user_id)
    }

    #[inline]
    pub fn is_hard(&self) -> bool {
        self.variant == SanctionVariant::Hard
    }

    #[inline]
    pub fn is_indefinite(&self) -> bool {
        self.duration.is_none()
    }

    /// Wall-clock expiry: `applied_at + duration`
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.duration.map(|duration| {
            self.applied_at
                .checked_add_signed(duration.as_time_delta())
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
        })
    }

    /// Indefinite sanctions never expire
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|expires_at| now >= expires_at)
    }

    /// Time left before expiry, zero once expired, `None` if indefinite
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<std::time::Duration> {
        self.expires_at()
            .map(|expires_at| (expires_at - now).to_std().unwrap_or_default())
    }

    /// Whether this record is the application of `key` made at `applied_at`
    pub fn is_application(&self, key: SanctionKey, applied_at: DateTime<Utc>) -> bool {
        self.key() == key && self.applied_at == applied_at
    }
}
