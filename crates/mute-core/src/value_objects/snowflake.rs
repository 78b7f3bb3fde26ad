//! Snowflake ID - 64-bit identifier used for guilds, members and roles
//!
//! Identifiers are opaque to this crate: they are issued by the host chat
//! platform and only compared, hashed and persisted here.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// 64-bit platform identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Snowflake(i64);

impl Snowflake {
    /// Create a new Snowflake from a raw i64 value
    #[inline]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner i64 value
    #[inline]
    pub const fn into_inner(self) -> i64 {
        self.0
    }

    /// Check if the Snowflake is zero (uninitialized)
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Parse from string representation
    pub fn parse(s: &str) -> Result<Self, SnowflakeParseError> {
        s.trim()
            .parse::<i64>()
            .map(Snowflake)
            .map_err(|_| SnowflakeParseError::InvalidFormat)
    }
}

/// Error when parsing a Snowflake from string
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SnowflakeParseError {
    #[error("invalid snowflake format")]
    InvalidFormat,
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Snowflake {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<Snowflake> for i64 {
    fn from(id: Snowflake) -> Self {
        id.0
    }
}

impl std::str::FromStr for Snowflake {
    type Err = SnowflakeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Snowflake::parse(s)
    }
}

// Serialized as a string so 64-bit IDs survive JSON consumers
impl Serialize for Snowflake {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct SnowflakeVisitor;

        impl Visitor<'_> for SnowflakeVisitor {
            type Value = Snowflake;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer representing a snowflake ID")
            }

            fn visit_i64<E>(self, value: i64) -> Result<Snowflake, E>
            where
                E: de::Error,
            {
                Ok(Snowflake(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Snowflake, E>
            where
                E: de::Error,
            {
                i64::try_from(value)
                    .map(Snowflake)
                    .map_err(|_| de::Error::custom("snowflake out of range"))
            }

            fn visit_str<E>(self, value: &str) -> Result<Snowflake, E>
            where
                E: de::Error,
            {
                Snowflake::parse(value).map_err(|_| de::Error::custom("invalid snowflake string"))
            }
        }

        deserializer.deserialize_any(SnowflakeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snowflake_parse() {
        assert_eq!(Snowflake::parse("123456789").unwrap(), Snowflake::new(123456789));
        assert_eq!(Snowflake::parse(" 42 ").unwrap(), Snowflake::new(42));
        assert!(Snowflake::parse("muted").is_err());
    }

    #[test]
    fn test_snowflake_zero() {
        assert!(Snowflake::default().is_zero());
        assert!(!Snowflake::new(1).is_zero());
    }

    #[test]
    fn test_snowflake_json_roundtrip_as_string() {
        let sf = Snowflake::new(987654321012345678);
        let json = serde_json::to_string(&sf).unwrap();
        assert_eq!(json, "\"987654321012345678\"");

        let back: Snowflake = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sf);
    }

    #[test]
    fn test_snowflake_deserialize_number() {
        let sf: Snowflake = serde_json::from_str("12345").unwrap();
        assert_eq!(sf.into_inner(), 12345);
    }

    #[test]
    fn test_snowflake_deserialize_out_of_range_number() {
        let result: Result<Snowflake, _> = serde_json::from_str("18446744073709551615");
        assert!(result.is_err());
    }
}
