//! Per-action success/failure measurements.

use std::time::Duration;

use crate::metrics::{MetricKey, MetricsRegistry};

/// Counter of action invocations, labelled `name`, `status` and, on
/// failure, `error`.
pub const ACTION_REQUESTS: &str = "ember/action/requests";
/// Histogram of action latency in milliseconds, labelled `name`.
pub const ACTION_LATENCY: &str = "ember/action/latency";

/// Records exactly one measurement per action invocation.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use ember_telemetry::{ActionMeter, MetricsRegistry};
///
/// let meter = ActionMeter::new(MetricsRegistry::new());
/// meter.record_success("echo", Duration::from_millis(3));
/// meter.record_failure("echo", Duration::from_millis(1), "execution", &"boom");
///
/// assert_eq!(meter.successes("echo"), 1);
/// assert_eq!(meter.failures("echo"), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ActionMeter {
    registry: MetricsRegistry,
}

impl ActionMeter {
    /// Create a meter writing into `registry`.
    pub fn new(registry: MetricsRegistry) -> Self {
        Self { registry }
    }

    /// The registry this meter writes into.
    pub fn registry(&self) -> &MetricsRegistry {
        &self.registry
    }

    /// Record a successful invocation of `name`.
    pub fn record_success(&self, name: &str, latency: Duration) {
        self.registry
            .counter_with(
                MetricKey::new(ACTION_REQUESTS)
                    .with_label("name", name)
                    .with_label("status", "success"),
            )
            .inc();
        self.observe_latency(name, latency);
        tracing::debug!(action = name, latency_ms = millis(latency), "action succeeded");
    }

    /// Record a failed invocation of `name`.
    ///
    /// `error_kind` is a low-cardinality label; the full error only goes to
    /// the debug record.
    pub fn record_failure(
        &self,
        name: &str,
        latency: Duration,
        error_kind: &str,
        error: &dyn std::fmt::Display,
    ) {
        self.registry
            .counter_with(
                MetricKey::new(ACTION_REQUESTS)
                    .with_label("name", name)
                    .with_label("status", "failure")
                    .with_label("error", error_kind),
            )
            .inc();
        self.observe_latency(name, latency);
        tracing::debug!(
            action = name,
            latency_ms = millis(latency),
            error_kind,
            error = %error,
            "action failed"
        );
    }

    /// Successful invocations recorded for `name`.
    pub fn successes(&self, name: &str) -> u64 {
        self.registry
            .sum_counters(ACTION_REQUESTS, &[("name", name), ("status", "success")])
    }

    /// Failed invocations recorded for `name`, across error kinds.
    pub fn failures(&self, name: &str) -> u64 {
        self.registry
            .sum_counters(ACTION_REQUESTS, &[("name", name), ("status", "failure")])
    }

    fn observe_latency(&self, name: &str, latency: Duration) {
        self.registry
            .histogram_with(MetricKey::new(ACTION_LATENCY).with_label("name", name))
            .observe(millis(latency));
    }
}

fn millis(latency: Duration) -> f64 {
    latency.as_secs_f64() * 1000.0
}
