//! File-backed guild mute configuration
//!
//! Reads a TOML or JSON file through the `config` crate:
//!
//! ```toml
//! [guilds.123456789012345678]
//! mute_role = "234567890123456789"
//! ```
//!
//! The file is read once at start; guild setup is owned elsewhere.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use config::{Config, File};
use serde::Deserialize;
use tracing::{info, warn};

use mute_core::entities::GuildMuteConfig;
use mute_core::traits::{MuteConfigProvider, RepoResult};
use mute_core::value_objects::Snowflake;

/// Errors while loading the guild configuration file
#[derive(Debug, thiserror::Error)]
pub enum GuildConfigError {
    #[error("Failed to read guild config: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid guild id '{0}' in guild config")]
    InvalidGuildId(String),
}

#[derive(Debug, Default, Deserialize)]
struct GuildsFile {
    #[serde(default)]
    guilds: HashMap<String, GuildEntry>,
}

#[derive(Debug, Deserialize)]
struct GuildEntry {
    mute_role: Snowflake,
}

/// MuteConfigProvider backed by a configuration file
#[derive(Debug, Clone, Default)]
pub struct FileMuteConfigProvider {
    configs: HashMap<Snowflake, GuildMuteConfig>,
}

impl FileMuteConfigProvider {
    /// Load guild settings from `path`
    ///
    /// A missing file yields an empty provider: every guild is unconfigured.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GuildConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "Guild config file not found, no mute roles configured");
            return Ok(Self::default());
        }

        let file: GuildsFile = Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize()?;

        let provider = Self::from_entries(file)?;
        info!(path = %path.display(), guilds = provider.configs.len(), "Loaded guild mute config");
        Ok(provider)
    }

    /// Parse guild settings from an in-memory TOML document
    pub fn from_toml(contents: &str) -> Result<Self, GuildConfigError> {
        let file: GuildsFile = Config::builder()
            .add_source(File::from_str(contents, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        Self::from_entries(file)
    }

    fn from_entries(file: GuildsFile) -> Result<Self, GuildConfigError> {
        let mut configs = HashMap::with_capacity(file.guilds.len());
        for (raw_id, entry) in file.guilds {
            let guild_id =
                Snowflake::parse(&raw_id).map_err(|_| GuildConfigError::InvalidGuildId(raw_id))?;
            configs.insert(guild_id, GuildMuteConfig::new(guild_id, entry.mute_role));
        }
        Ok(Self { configs })
    }

    /// Number of configured guilds
    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

#[async_trait]
impl MuteConfigProvider for FileMuteConfigProvider {
    async fn mute_config(&self, guild_id: Snowflake) -> RepoResult<Option<GuildMuteConfig>> {
        Ok(self.configs.get(&guild_id).copied())
    }
}
