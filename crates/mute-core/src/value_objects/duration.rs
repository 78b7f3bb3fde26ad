//! Mute duration - a strictly positive number of seconds
//!
//! Accepts the short human forms moderators type (`30s`, `10m`, `2h`, `1d`,
//! `1w`, compounds like `1h30m`) as well as a bare number of seconds.

use std::fmt;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Length of a timed sanction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct MuteDuration(u64);

impl MuteDuration {
    /// Largest duration that still fits a `TimeDelta`
    pub const MAX_SECS: u64 = (i64::MAX / 1000) as u64;

    /// Create a duration from a number of seconds
    pub fn from_secs(secs: u64) -> Result<Self, DomainError> {
        if secs == 0 {
            return Err(DomainError::InvalidDuration(
                "duration must be greater than zero".to_string(),
            ));
        }
        if secs > Self::MAX_SECS {
            return Err(DomainError::InvalidDuration("duration is too long".to_string()));
        }
        Ok(Self(secs))
    }

    /// Parse a human duration such as `10m`, `2h`, `1d12h` or `90`
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidDuration("duration is empty".to_string()));
        }

        if let Ok(secs) = trimmed.parse::<u64>() {
            return Self::from_secs(secs);
        }

        let invalid = || DomainError::InvalidDuration(format!("unrecognised duration '{trimmed}'"));
        let lower = trimmed.to_ascii_lowercase();
        let mut rest = lower.as_str();
        let mut total: u64 = 0;

        while !rest.is_empty() {
            rest = rest.trim_start();

            let digits_end = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            if digits_end == 0 {
                return Err(invalid());
            }
            let amount: u64 = rest[..digits_end].parse().map_err(|_| invalid())?;
            rest = rest[digits_end..].trim_start();

            let unit_end = rest
                .find(|c: char| !c.is_ascii_alphabetic())
                .unwrap_or(rest.len());
            let multiplier = unit_seconds(&rest[..unit_end]).ok_or_else(invalid)?;
            rest = &rest[unit_end..];

            total = amount
                .checked_mul(multiplier)
                .and_then(|secs| total.checked_add(secs))
                .ok_or_else(|| DomainError::InvalidDuration("duration is too long".to_string()))?;
        }

        Self::from_secs(total)
    }

    /// Number of whole seconds
    #[inline]
    pub const fn as_secs(self) -> u64 {
        self.0
    }

    /// As a std duration, for runtime timers
    #[inline]
    pub const fn as_std(self) -> std::time::Duration {
        std::time::Duration::from_secs(self.0)
    }

    /// As a chrono delta, for wall-clock arithmetic
    pub fn as_time_delta(self) -> TimeDelta {
        TimeDelta::try_seconds(self.0 as i64).unwrap_or(TimeDelta::MAX)
    }
}

fn unit_seconds(unit: &str) -> Option<u64> {
    match unit {
        "s" | "sec" | "secs" | "second" | "seconds" => Some(1),
        "m" | "min" | "mins" | "minute" | "minutes" => Some(60),
        "h" | "hr" | "hrs" | "hour" | "hours" => Some(3_600),
        "d" | "day" | "days" => Some(86_400),
        "w" | "week" | "weeks" => Some(604_800),
        _ => None,
    }
}

impl TryFrom<u64> for MuteDuration {
    type Error = DomainError;

    fn try_from(secs: u64) -> Result<Self, Self::Error> {
        Self::from_secs(secs)
    }
}

impl From<MuteDuration> for u64 {
    fn from(duration: MuteDuration) -> Self {
        duration.0
    }
}

impl std::str::FromStr for MuteDuration {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Renders as `1 day 2 hours 5 minutes`
impl fmt::Display for MuteDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut remaining = self.0;
        let mut first = true;

        for (name, unit) in [("day", 86_400), ("hour", 3_600), ("minute", 60), ("second", 1)] {
            let count = remaining / unit;
            remaining %= unit;
            if count == 0 {
                continue;
            }
            if !first {
                f.write_str(" ")?;
            }
            let plural = if count == 1 { "" } else { "s" };
            write!(f, "{count} {name}{plural}")?;
            first = false;
        }

        Ok(())
    }
}
