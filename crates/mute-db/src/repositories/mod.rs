//! PostgreSQL implementations of the sanction ports

mod directory;
mod error;
mod sanction;
mod snapshot;

pub use directory::PgPrivilegeDirectory;
pub use error::{map_db_error, map_directory_error, map_unique_violation};
pub use sanction::PgSanctionRepository;
pub use snapshot::PgSnapshotRepository;
