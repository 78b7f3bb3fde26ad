//! Database models - raw row types for SQLx queries

mod held_role;
mod sanction;
mod snapshot;

pub use held_role::HeldRoleModel;
pub use sanction::SanctionModel;
pub use snapshot::SnapshotModel;
