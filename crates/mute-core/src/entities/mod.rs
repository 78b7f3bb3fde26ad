//! Domain entities - sanction records, privilege snapshots and guild mute settings

mod guild_config;
mod sanction;
mod snapshot;

pub use guild_config::GuildMuteConfig;
pub use sanction::{SanctionKey, SanctionRecord, SanctionVariant};
pub use snapshot::PrivilegeSnapshot;
