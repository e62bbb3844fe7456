//! Configuration presets for common scenarios

use super::{Config, DisplayConfig, Fields, Format, WriterConfig};
use crate::LogResult;

impl Config {
    /// Create configuration from environment variables.
    ///
    /// Reads `EMBER_LOG` (falling back to `RUST_LOG`) for filter directives,
    /// `EMBER_LOG_FORMAT` for the format, and `EMBER_SERVICE`, `EMBER_ENV`,
    /// `EMBER_VERSION` for global fields.
    pub fn from_env() -> LogResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> LogResult<Self> {
        let mut config = Self::default();

        if let Some(level) = lookup("EMBER_LOG").or_else(|| lookup("RUST_LOG")) {
            config.level = level;
        }
        if let Some(format) = lookup("EMBER_LOG_FORMAT") {
            config.format = format.parse()?;
        }
        config.fields = Fields::from_lookup(&lookup);

        Ok(config)
    }

    /// Development configuration (pretty, debug level)
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_owned(),
            format: Format::Pretty,
            display: DisplayConfig {
                colors: true,
                source: true,
                ..DisplayConfig::default()
            },
            ..Self::default()
        }
    }

    /// Production configuration (JSON, info level)
    #[must_use]
    pub fn production() -> Self {
        Self {
            level: "info".to_owned(),
            format: Format::Json,
            display: DisplayConfig {
                colors: false,
                source: false,
                flatten: true,
                ..DisplayConfig::default()
            },
            ..Self::default()
        }
    }

    /// Test configuration (output captured by the test harness)
    #[must_use]
    pub fn test() -> Self {
        Self {
            level: "debug".to_owned(),
            format: Format::Compact,
            writer: WriterConfig::Test,
            display: DisplayConfig {
                colors: false,
                time: false,
                ..DisplayConfig::default()
            },
            ..Self::default()
        }
    }
}
