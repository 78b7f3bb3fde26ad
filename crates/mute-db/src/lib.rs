//! # mute-db
//!
//! Persistence layer implementing the sanction ports from `mute-core`.
//!
//! ## Overview
//!
//! - Connection pool management and idempotent schema bootstrap
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - PostgreSQL repositories for active sanctions and privilege snapshots
//! - A PostgreSQL-backed privilege directory over `member_roles`
//! - In-memory stores with the same semantics, for tests and database-less runs
//! - A file-backed guild mute configuration provider
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mute_db::pool::{create_pool, ensure_schema, DatabaseConfig};
//! use mute_db::repositories::PgSanctionRepository;
//! use mute_core::traits::SanctionRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env();
//!     let pool = create_pool(&config).await?;
//!     ensure_schema(&pool).await?;
//!     let sanctions = PgSanctionRepository::new(pool);
//!
//!     let active = sanctions.list_all().await?;
//!     Ok(())
//! }
//! ```

pub mod guild_config;
pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use guild_config::{FileMuteConfigProvider, GuildConfigError};
pub use memory::{
    InMemoryPrivilegeDirectory, InMemorySanctionRepository, InMemorySnapshotRepository,
    StaticMuteConfigProvider,
};
pub use pool::{create_pool, create_pool_from_env, ensure_schema, DatabaseConfig, PgPool};
pub use repositories::{PgPrivilegeDirectory, PgSanctionRepository, PgSnapshotRepository};
