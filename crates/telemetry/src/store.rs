//! Trace stores.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::error::TelemetryResult;
use crate::span::SpanRecord;

/// Destination for finished spans.
pub trait TraceStore: Send + Sync {
    /// Persist one finished span.
    fn save(&self, record: &SpanRecord) -> TelemetryResult<()>;

    /// Flush anything buffered. The default does nothing.
    fn flush(&self) -> TelemetryResult<()> {
        Ok(())
    }
}

/// Bounded in-memory store, oldest spans evicted first.
///
/// # Examples
///
/// ```
/// use ember_telemetry::InMemoryTraceStore;
///
/// let store = InMemoryTraceStore::new(100);
/// assert!(store.is_empty());
/// assert!(store.load("missing").is_empty());
/// ```
#[derive(Debug)]
pub struct InMemoryTraceStore {
    capacity: usize,
    spans: Mutex<VecDeque<SpanRecord>>,
}

impl InMemoryTraceStore {
    /// Create a store holding at most `capacity` spans.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            spans: Mutex::new(VecDeque::new()),
        }
    }

    /// Every stored span, oldest first.
    pub fn list(&self) -> Vec<SpanRecord> {
        self.spans.lock().iter().cloned().collect()
    }

    /// Spans belonging to `trace_id`, in the order they finished.
    pub fn load(&self, trace_id: &str) -> Vec<SpanRecord> {
        self.spans
            .lock()
            .iter()
            .filter(|record| record.trace_id == trace_id)
            .cloned()
            .collect()
    }

    /// Number of stored spans.
    pub fn len(&self) -> usize {
        self.spans.lock().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.spans.lock().is_empty()
    }

    /// Drop every stored span.
    pub fn clear(&self) {
        self.spans.lock().clear();
    }
}

impl Default for InMemoryTraceStore {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_TRACE_CAPACITY)
    }
}

impl TraceStore for InMemoryTraceStore {
    fn save(&self, record: &SpanRecord) -> TelemetryResult<()> {
        let mut spans = self.spans.lock();
        while spans.len() >= self.capacity {
            spans.pop_front();
        }
        spans.push_back(record.clone());
        Ok(())
    }
}
