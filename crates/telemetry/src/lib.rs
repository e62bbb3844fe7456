#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Ember Telemetry
//!
//! Trace spans, trace stores, and action metrics for Ember.
//!
//! This crate provides:
//! - [`TracingState`] -- the scope a traced call runs in: trace stores plus
//!   an [`ActionMeter`]
//! - [`ActiveSpan`] / [`SpanRecord`] -- an open span and its finished form
//! - [`TraceStore`] trait and [`InMemoryTraceStore`] for inspection
//! - [`MetricsRegistry`] -- labelled in-memory counters and histograms
//! - [`global`] / [`install_global`] / [`shutdown_global`] -- the
//!   process-wide default state
//!
//! Spans are also mirrored as `tracing` spans, so any subscriber installed
//! by the application sees them.

mod config;
mod error;
mod global;
mod meter;
pub mod metrics;
mod span;
mod state;
mod store;

pub use config::{DEFAULT_TRACE_CAPACITY, TelemetryConfig, TraceStoreConfig};
pub use error::{TelemetryError, TelemetryResult};
pub use global::{global, install_global, shutdown_global};
pub use meter::{ACTION_LATENCY, ACTION_REQUESTS, ActionMeter};
pub use metrics::{Counter, Histogram, MetricKey, MetricsRegistry};
pub use span::{ActiveSpan, SpanOptions, SpanRecord, SpanState};
pub use state::{TracingState, to_span_value};
pub use store::{InMemoryTraceStore, TraceStore};
