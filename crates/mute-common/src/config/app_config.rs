//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use std::env;
use std::time::Duration;

use mute_core::Snowflake;
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseConfig,
    pub reconciler: ReconcilerConfig,
    pub engine: EngineConfig,
    pub guilds: GuildConfigSource,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Expiry reconciler settings
#[derive(Debug, Clone, Deserialize)]
pub struct ReconcilerConfig {
    /// Seconds between two scans of the active sanctions
    #[serde(default = "default_reconcile_interval")]
    pub interval_secs: u64,
    /// Keys reversed concurrently within one pass
    #[serde(default = "default_reconcile_concurrency")]
    pub max_concurrency: usize,
}

impl ReconcilerConfig {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_reconcile_interval(),
            max_concurrency: default_reconcile_concurrency(),
        }
    }
}

/// Sanction engine settings
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// The system's own identity, which can never be sanctioned
    pub system_user_id: Snowflake,
    /// Schedule in-process reversal timers for timed sanctions
    #[serde(default = "default_inline_timers")]
    pub inline_timers: bool,
}

/// Where per-guild mute settings are read from
#[derive(Debug, Clone, Deserialize)]
pub struct GuildConfigSource {
    #[serde(default = "default_guild_config_path")]
    pub path: String,
}

// Default value functions
fn default_app_name() -> String {
    "mute-worker".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_reconcile_interval() -> u64 {
    300 // 5 minutes
}

fn default_reconcile_concurrency() -> usize {
    8
}

fn default_inline_timers() -> bool {
    true
}

fn default_guild_config_path() -> String {
    "config/guilds.toml".to_string()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or invalid
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let interval_secs = match lookup("RECONCILE_INTERVAL_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidValue("RECONCILE_INTERVAL_SECS", raw))?,
            None => default_reconcile_interval(),
        };

        let system_user_id = lookup("SYSTEM_USER_ID").ok_or(ConfigError::MissingVar("SYSTEM_USER_ID"))?;
        let system_user_id = Snowflake::parse(&system_user_id)
            .map_err(|_| ConfigError::InvalidValue("SYSTEM_USER_ID", system_user_id))?;

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: lookup("APP_ENV")
                    .and_then(|s| Environment::parse(&s))
                    .unwrap_or_default(),
            },
            database: DatabaseConfig {
                url: lookup("DATABASE_URL").ok_or(ConfigError::MissingVar("DATABASE_URL"))?,
                max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_max_connections),
                min_connections: lookup("DATABASE_MIN_CONNECTIONS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_min_connections),
            },
            reconciler: ReconcilerConfig {
                interval_secs,
                max_concurrency: lookup("RECONCILE_MAX_CONCURRENCY")
                    .and_then(|s| s.parse().ok())
                    .filter(|n| *n > 0)
                    .unwrap_or_else(default_reconcile_concurrency),
            },
            engine: EngineConfig {
                system_user_id,
                inline_timers: lookup("INLINE_TIMERS")
                    .and_then(|s| parse_bool(&s))
                    .unwrap_or_else(default_inline_timers),
            },
            guilds: GuildConfigSource {
                path: lookup("GUILD_CONFIG_PATH").unwrap_or_else(default_guild_config_path),
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
