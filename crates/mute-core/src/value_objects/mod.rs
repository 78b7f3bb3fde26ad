//! Value objects - immutable types that represent domain concepts

mod duration;
mod snowflake;

pub use duration::MuteDuration;
pub use snowflake::{Snowflake, SnowflakeParseError};
