//! Entity to model mappers
//!
//! Conversions between domain entities (mute-core) and database models.
//! - `TryFrom<Model> for Entity` / `From<Model> for Entity`: database rows to domain objects
//! - `*Insert` structs: entity data prepared for binding

mod sanction;
mod snapshot;

pub use sanction::SanctionInsert;
pub use snapshot::SnapshotInsert;
