//! # Ember Log
//!
//! Logging setup for Ember applications and tests.
//!
//! Library crates only emit `tracing` events; this crate installs the
//! subscriber that renders them.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! fn main() -> ember_log::LogResult<()> {
//!     // Pick a configuration from the environment and build profile
//!     let _guard = ember_log::auto_init()?;
//!
//!     tracing::info!(port = 8080, "server starting");
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod builder;
mod config;

pub use builder::{LoggerBuilder, LoggerGuard};
pub use config::{Config, DisplayConfig, Fields, Format, WriterConfig};

/// Result type for logger operations
pub type LogResult<T> = Result<T, LogError>;

/// Error type for logger operations
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LogError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Filter directives could not be parsed
    #[error("invalid filter `{directives}`: {reason}")]
    Filter {
        /// The directives as given
        directives: String,
        /// Parser message
        reason: String,
    },

    /// A global subscriber is already installed
    #[error("logger already initialized: {0}")]
    AlreadyInitialized(String),
}

// ============================================================================
// Initialization Functions
// ============================================================================

/// Auto-detect and initialize the best logging configuration
///
/// Environment settings win; otherwise debug builds get
/// [`Config::development`] and release builds [`Config::production`].
pub fn auto_init() -> LogResult<LoggerGuard> {
    if std::env::var("EMBER_LOG").is_ok() || std::env::var("RUST_LOG").is_ok() {
        init_with(Config::from_env()?)
    } else if cfg!(debug_assertions) {
        init_with(Config::development())
    } else {
        init_with(Config::production())
    }
}

/// Initialize with default configuration
pub fn init() -> LogResult<LoggerGuard> {
    init_with(Config::default())
}

/// Initialize with custom configuration
pub fn init_with(config: Config) -> LogResult<LoggerGuard> {
    LoggerBuilder::from_config(config).build()
}

/// Initialize for tests (captures logs)
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_test() -> LogResult<LoggerGuard> {
    if tracing::dispatcher::has_been_set() {
        return Ok(LoggerGuard::noop());
    }
    match init_with(Config::test()) {
        Err(LogError::AlreadyInitialized(_)) => Ok(LoggerGuard::noop()),
        other => other,
    }
}
