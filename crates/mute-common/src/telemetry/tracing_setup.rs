//! Tracing and logging setup
//!
//! Configures the `tracing` subscriber with environment-based filtering.

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::Environment;

/// Tracing configuration options
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Log level filter used when `RUST_LOG` is unset
    pub level: Level,
    /// Enable JSON output format
    pub json: bool,
    /// Include span events (new, close)
    pub span_events: bool,
    /// Include file and line numbers
    pub file_line: bool,
    /// Include thread names
    pub thread_names: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json: false,
            span_events: false,
            file_line: true,
            thread_names: false,
        }
    }
}

impl TracingConfig {
    /// Create a development configuration with debug logging
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            json: false,
            span_events: true,
            file_line: true,
            thread_names: true,
        }
    }

    /// Create a production configuration with JSON logging
    #[must_use]
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            json: true,
            span_events: false,
            file_line: false,
            thread_names: false,
        }
    }

    /// Pick the preset matching the deployment environment
    #[must_use]
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => Self::development(),
            Environment::Staging => Self::default(),
            Environment::Production => Self::production(),
        }
    }

    fn span_events(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

/// Try to initialize tracing with the default configuration
///
/// Uses `RUST_LOG` for filtering if set, otherwise the configured level.
pub fn try_init_tracing() -> Result<(), TracingError> {
    try_init_tracing_with_config(TracingConfig::default())
}

/// Try to initialize tracing with custom configuration
///
/// Returns `TracingError::AlreadyInitialized` instead of panicking when a
/// global subscriber is already set.
pub fn try_init_tracing_with_config(config: TracingConfig) -> Result<(), TracingError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));

    if config.json {
        let fmt_layer = fmt::layer()
            .json()
            .with_file(config.file_line)
            .with_line_number(config.file_line)
            .with_thread_names(config.thread_names)
            .with_span_events(config.span_events());

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|_| TracingError::AlreadyInitialized)
    } else {
        let fmt_layer = fmt::layer()
            .with_file(config.file_line)
            .with_line_number(config.file_line)
            .with_thread_names(config.thread_names)
            .with_span_events(config.span_events());

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|_| TracingError::AlreadyInitialized)
    }
}

/// Tracing initialization errors
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Tracing subscriber already initialized")]
    AlreadyInitialized,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TracingConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert!(!config.json);
        assert!(config.file_line);
    }

    #[test]
    fn test_environment_presets() {
        let dev = TracingConfig::for_environment(Environment::Development);
        assert_eq!(dev.level, Level::DEBUG);
        assert!(dev.span_events);

        let prod = TracingConfig::for_environment(Environment::Production);
        assert!(prod.json);
        assert!(!prod.file_line);
    }

    #[test]
    fn test_second_init_reports_already_initialized() {
        // Whichever call wins, the other must fail without panicking
        let first = try_init_tracing();
        let second = try_init_tracing();
        assert!(first.is_ok() || second.is_err());
        assert!(matches!(second, Err(TracingError::AlreadyInitialized)));
    }
}
