//! Logger builder implementation

#[macro_use]
mod format;

use tracing_subscriber::fmt::{self, writer::BoxMakeWriter};
use tracing_subscriber::{EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, Format, WriterConfig};
use crate::{LogError, LogResult};

/// Logger builder
#[derive(Debug)]
pub struct LoggerBuilder {
    config: Config,
}

/// Guard that keeps the logger alive
///
/// Holds the entered root span carrying the global fields. Dropping the
/// guard exits that span; the subscriber itself stays installed.
#[derive(Debug)]
pub struct LoggerGuard {
    _root_span: Option<tracing::span::EnteredSpan>,
}

impl LoggerGuard {
    /// A guard for when a subscriber was already installed elsewhere.
    #[must_use]
    pub fn noop() -> Self {
        Self { _root_span: None }
    }
}

impl LoggerBuilder {
    /// Create builder from config
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Build and install the global subscriber
    ///
    /// # Errors
    ///
    /// Returns an error if the filter directives cannot be parsed or a
    /// global subscriber is already installed.
    pub fn build(self) -> LogResult<LoggerGuard> {
        let filter = EnvFilter::try_new(&self.config.level).map_err(|e| LogError::Filter {
            directives: self.config.level.clone(),
            reason: e.to_string(),
        })?;

        let writer = make_writer(self.config.writer);
        let display = &self.config.display;

        let fmt_layer = match self.config.format {
            Format::Pretty => boxed_fmt_layer!(fmt::layer().pretty(), display, writer),
            Format::Compact => boxed_fmt_layer!(fmt::layer().compact(), display, writer),
            Format::Json => boxed_fmt_layer!(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(display.span_list)
                    .flatten_event(display.flatten),
                display,
                writer
            ),
        };

        Registry::default()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| LogError::AlreadyInitialized(e.to_string()))?;

        let fields = &self.config.fields;
        let root_span = (!fields.is_empty()).then(|| {
            tracing::info_span!(
                "app",
                service = fields.service.as_deref().unwrap_or(""),
                env = fields.env.as_deref().unwrap_or(""),
                version = fields.version.as_deref().unwrap_or("")
            )
            .entered()
        });

        tracing::debug!(
            level = %self.config.level,
            format = ?self.config.format,
            "logger initialized"
        );

        Ok(LoggerGuard {
            _root_span: root_span,
        })
    }
}

fn make_writer(writer: WriterConfig) -> BoxMakeWriter {
    match writer {
        WriterConfig::Stdout => BoxMakeWriter::new(std::io::stdout),
        WriterConfig::Test => BoxMakeWriter::new(fmt::TestWriter::new()),
        WriterConfig::Stderr => BoxMakeWriter::new(std::io::stderr),
    }
}
