//! # mute-core
//!
//! Domain layer containing sanction entities, value objects, the error taxonomy,
//! and the ports (repository, directory, configuration and clock traits).
//! This crate has zero dependencies on infrastructure (database, runtime, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{GuildMuteConfig, PrivilegeSnapshot, SanctionKey, SanctionRecord, SanctionVariant};
pub use error::{DirectoryError, DomainError, PrivilegeFailure};
pub use traits::{
    Clock, DirectoryResult, HeldRole, ManualClock, MuteConfigProvider, PrivilegeDirectory,
    RepoResult, SanctionRepository, SnapshotRepository, SystemClock,
};
pub use value_objects::{MuteDuration, Snowflake, SnowflakeParseError};
