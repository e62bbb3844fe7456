//! Telemetry configuration.

use serde::{Deserialize, Serialize};

use crate::error::{TelemetryError, TelemetryResult};

/// Default number of spans kept by the in-memory store.
pub const DEFAULT_TRACE_CAPACITY: usize = 1024;

/// Configuration for a [`TracingState`](crate::TracingState).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Service name recorded on every `ember.span` tracing span.
    pub service_name: String,
    /// Where finished spans go.
    pub trace_store: TraceStoreConfig,
}

/// Trace store selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TraceStoreConfig {
    /// Spans are not exported.
    #[default]
    Disabled,
    /// Spans are kept in a bounded in-memory store.
    Memory {
        /// Maximum number of spans kept.
        capacity: usize,
    },
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "ember".to_owned(),
            trace_store: TraceStoreConfig::Disabled,
        }
    }
}

impl TelemetryConfig {
    /// Development preset: spans kept in memory for inspection.
    pub fn development() -> Self {
        Self {
            trace_store: TraceStoreConfig::Memory {
                capacity: DEFAULT_TRACE_CAPACITY,
            },
            ..Self::default()
        }
    }

    /// Read `EMBER_SERVICE_NAME`, `EMBER_TRACE_STORE` (`disabled` or
    /// `memory`) and `EMBER_TRACE_CAPACITY`.
    pub fn from_env() -> TelemetryResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> TelemetryResult<Self> {
        let mut config = Self::default();
        if let Some(name) = lookup("EMBER_SERVICE_NAME") {
            config.service_name = name;
        }

        let capacity = match lookup("EMBER_TRACE_CAPACITY") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|capacity| *capacity > 0)
                .ok_or_else(|| {
                    TelemetryError::Config(format!(
                        "EMBER_TRACE_CAPACITY `{raw}` is not a positive integer"
                    ))
                })?,
            None => DEFAULT_TRACE_CAPACITY,
        };

        config.trace_store = match lookup("EMBER_TRACE_STORE").as_deref().map(str::trim) {
            None | Some("" | "disabled" | "none") => TraceStoreConfig::Disabled,
            Some("memory") => TraceStoreConfig::Memory { capacity },
            Some(other) => {
                return Err(TelemetryError::Config(format!(
                    "unknown trace store `{other}`"
                )));
            }
        };
        Ok(config)
    }
}
