//! Tracing scope shared by traced calls.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::Instrument;

use crate::config::{TelemetryConfig, TraceStoreConfig};
use crate::error::{TelemetryError, TelemetryResult};
use crate::meter::ActionMeter;
use crate::metrics::MetricsRegistry;
use crate::span::{ActiveSpan, SpanOptions, SpanRecord};
use crate::store::{InMemoryTraceStore, TraceStore};

/// Everything a traced call needs: where spans go and where measurements go.
///
/// A state is usually wrapped in an `Arc` and either attached to individual
/// actions or installed process-wide with
/// [`install_global`](crate::install_global).
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use ember_telemetry::{InMemoryTraceStore, TracingState};
///
/// let store = Arc::new(InMemoryTraceStore::new(64));
/// let state = TracingState::new().with_store(store.clone());
/// assert_eq!(state.meter().successes("anything"), 0);
/// ```
pub struct TracingState {
    service_name: String,
    stores: Vec<Arc<dyn TraceStore>>,
    memory: Option<Arc<InMemoryTraceStore>>,
    meter: ActionMeter,
}

impl TracingState {
    /// A state with no trace stores and a fresh metrics registry.
    pub fn new() -> Self {
        Self::with_registry(MetricsRegistry::new())
    }

    /// A state with no trace stores writing measurements into `registry`.
    pub fn with_registry(registry: MetricsRegistry) -> Self {
        Self {
            service_name: TelemetryConfig::default().service_name,
            stores: Vec::new(),
            memory: None,
            meter: ActionMeter::new(registry),
        }
    }

    /// Build a state from configuration.
    pub fn from_config(config: &TelemetryConfig) -> Self {
        let mut state = Self::new();
        state.service_name.clone_from(&config.service_name);
        if let TraceStoreConfig::Memory { capacity } = config.trace_store {
            let store = Arc::new(InMemoryTraceStore::new(capacity));
            state.memory = Some(Arc::clone(&store));
            state.stores.push(store);
        }
        tracing::debug!(
            service = %state.service_name,
            stores = state.stores.len(),
            "tracing state configured"
        );
        state
    }

    /// Add a trace store. Spans are saved to every store in insertion order.
    pub fn with_store(mut self, store: Arc<dyn TraceStore>) -> Self {
        self.stores.push(store);
        self
    }

    /// Service name from configuration.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// The in-memory store created from configuration, if any.
    pub fn memory_store(&self) -> Option<&Arc<InMemoryTraceStore>> {
        self.memory.as_ref()
    }

    /// Metrics registry receiving action measurements.
    pub fn metrics(&self) -> &MetricsRegistry {
        self.meter.registry()
    }

    /// Meter recording per-action success and failure.
    pub fn meter(&self) -> &ActionMeter {
        &self.meter
    }

    /// Run `f` inside a new span.
    ///
    /// The span nests under `parent` unless `options` asks for a root span.
    /// `f` runs inside an `ember.span` tracing span carrying the service name
    /// and the span identifiers.
    /// When `f` resolves, the span is finished with `input`, the serialized
    /// output or the error message, and saved to every store. Export failures
    /// are logged and never change the result of `f`.
    pub async fn run_in_new_span<O, E, F, Fut>(
        &self,
        parent: Option<&ActiveSpan>,
        options: SpanOptions<'_>,
        input: Value,
        f: F,
    ) -> Result<O, E>
    where
        O: Serialize,
        E: fmt::Display,
        F: FnOnce(Arc<ActiveSpan>) -> Fut,
        Fut: Future<Output = Result<O, E>>,
    {
        let span = Arc::new(ActiveSpan::start(parent, options));
        let instrument = tracing::debug_span!(
            "ember.span",
            service = %self.service_name,
            span_name = span.name(),
            span_type = span.span_type(),
            trace_id = span.trace_id(),
            span_id = span.span_id(),
        );

        let result = f(Arc::clone(&span)).instrument(instrument).await;

        if !self.stores.is_empty() {
            let record = match &result {
                Ok(output) => span.finish(input, to_span_value(output), None),
                Err(err) => span.finish(input, Value::Null, Some(err.to_string())),
            };
            self.export(&record);
        }
        result
    }

    /// Flush every store, returning the first failure.
    pub fn flush(&self) -> TelemetryResult<()> {
        let mut first: Option<TelemetryError> = None;
        for store in &self.stores {
            if let Err(err) = store.flush() {
                tracing::warn!(error = %err, "failed to flush trace store");
                first.get_or_insert(err);
            }
        }
        first.map_or(Ok(()), Err)
    }

    fn export(&self, record: &SpanRecord) {
        for store in &self.stores {
            if let Err(err) = store.save(record) {
                tracing::warn!(
                    error = %err,
                    span = %record.path,
                    trace_id = %record.trace_id,
                    "failed to export span"
                );
            }
        }
    }
}

impl Default for TracingState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TracingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracingState")
            .field("service_name", &self.service_name)
            .field("stores", &self.stores.len())
            .field("meter", &self.meter)
            .finish_non_exhaustive()
    }
}

/// Serialize a value for a span record, falling back to a description of
/// the serialization error.
pub fn to_span_value<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value)
        .unwrap_or_else(|err| Value::String(format!("<unserializable: {err}>")))
}
