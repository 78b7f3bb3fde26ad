//! Ports - the interfaces the domain needs from the outside world

mod clock;
mod directory;
mod repositories;

pub use clock::{Clock, ManualClock, SystemClock};
pub use directory::{DirectoryResult, HeldRole, MuteConfigProvider, PrivilegeDirectory};
pub use repositories::{RepoResult, SanctionRepository, SnapshotRepository};
