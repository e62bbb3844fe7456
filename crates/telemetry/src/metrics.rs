//! Metrics primitives and registry.
//!
//! Lightweight labelled metrics (counter, histogram) stored in memory with
//! atomics and locks. No external exporter is required; a collector can read the
//! registry at any time.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};

/// Name plus label set identifying one metric series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetricKey {
    name: String,
    labels: BTreeMap<String, String>,
}

impl MetricKey {
    /// Create a key with no labels.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            labels: BTreeMap::new(),
        }
    }

    /// Add a label.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Metric name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Label value for `key`, if set.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    fn matches(&self, name: &str, labels: &[(&str, &str)]) -> bool {
        self.name == name && labels.iter().all(|(k, v)| self.label(k) == Some(*v))
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if self.labels.is_empty() {
            return Ok(());
        }
        f.write_str("{")?;
        for (i, (k, v)) in self.labels.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{k}={v}")?;
        }
        f.write_str("}")
    }
}

/// An incrementing counter.
#[derive(Debug, Clone, Default)]
pub struct Counter {
    value: Arc<AtomicU64>,
}

impl Counter {
    /// Create a new counter starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment by one.
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment by a given amount.
    pub fn inc_by(&self, n: u64) {
        self.value.fetch_add(n, Ordering::Relaxed);
    }

    /// Current value.
    #[must_use]
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// A histogram that keeps running totals of its observations.
///
/// State is fixed-size: the count, sum and minimum are updated in place and
/// individual observations are not retained.
#[derive(Debug, Clone, Default)]
pub struct Histogram {
    totals: Arc<Mutex<Totals>>,
}

#[derive(Debug, Default)]
struct Totals {
    count: usize,
    sum: f64,
    min: Option<f64>,
}

impl Histogram {
    /// Create a new histogram.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an observation.
    pub fn observe(&self, value: f64) {
        let mut totals = self.totals.lock();
        totals.count += 1;
        totals.sum += value;
        totals.min = Some(totals.min.map_or(value, |min| min.min(value)));
    }

    /// Number of observations recorded.
    #[must_use]
    pub fn count(&self) -> usize {
        self.totals.lock().count
    }

    /// Sum of all observations.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.totals.lock().sum
    }

    /// Smallest observation, if any.
    #[must_use]
    pub fn min(&self) -> Option<f64> {
        self.totals.lock().min
    }
}

/// Registry for creating and retrieving labelled metrics.
///
/// # Examples
///
/// ```
/// use ember_telemetry::metrics::{MetricKey, MetricsRegistry};
///
/// let registry = MetricsRegistry::new();
/// let key = MetricKey::new("requests").with_label("status", "success");
/// registry.counter_with(key.clone()).inc();
///
/// // Retrieving the same key returns the same metric.
/// assert_eq!(registry.counter_with(key).get(), 1);
/// assert_eq!(registry.sum_counters("requests", &[]), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MetricsRegistry {
    counters: Arc<RwLock<HashMap<MetricKey, Counter>>>,
    histograms: Arc<RwLock<HashMap<MetricKey, Histogram>>>,
}

impl MetricsRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create an unlabelled counter.
    pub fn counter(&self, name: &str) -> Counter {
        self.counter_with(MetricKey::new(name))
    }

    /// Get or create the counter for a labelled series.
    pub fn counter_with(&self, key: MetricKey) -> Counter {
        if let Some(counter) = self.counters.read().get(&key) {
            return counter.clone();
        }
        self.counters.write().entry(key).or_default().clone()
    }

    /// Get or create an unlabelled histogram.
    pub fn histogram(&self, name: &str) -> Histogram {
        self.histogram_with(MetricKey::new(name))
    }

    /// Get or create the histogram for a labelled series.
    pub fn histogram_with(&self, key: MetricKey) -> Histogram {
        if let Some(histogram) = self.histograms.read().get(&key) {
            return histogram.clone();
        }
        self.histograms.write().entry(key).or_default().clone()
    }

    /// Sum of every counter named `name` whose labels include all of
    /// `labels`.
    pub fn sum_counters(&self, name: &str, labels: &[(&str, &str)]) -> u64 {
        self.counters
            .read()
            .iter()
            .filter(|(key, _)| key.matches(name, labels))
            .map(|(_, counter)| counter.get())
            .sum()
    }

    /// Total observation count of every histogram named `name` whose labels
    /// include all of `labels`.
    pub fn count_observations(&self, name: &str, labels: &[(&str, &str)]) -> usize {
        self.histograms
            .read()
            .iter()
            .filter(|(key, _)| key.matches(name, labels))
            .map(|(_, histogram)| histogram.count())
            .sum()
    }

    /// Keys of every registered counter, sorted.
    pub fn counter_keys(&self) -> Vec<MetricKey> {
        let mut keys: Vec<MetricKey> = self.counters.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}
