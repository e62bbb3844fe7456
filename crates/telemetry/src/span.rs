//! Trace spans.
//!
//! An [`ActiveSpan`] lives for the duration of one traced call. When the call
//! returns it is finished into a [`SpanRecord`], the serializable form handed
//! to every configured [`TraceStore`](crate::TraceStore).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a new span is named and where it sits in the trace.
#[derive(Debug, Clone, Copy)]
pub struct SpanOptions<'a> {
    /// Span name, usually the action name.
    pub name: &'a str,
    /// Span type, e.g. `action` or `flow`.
    pub span_type: &'a str,
    /// Start a new trace instead of nesting under the parent span.
    pub is_root: bool,
}

impl<'a> SpanOptions<'a> {
    /// Options for a nested span of the given type.
    pub const fn new(name: &'a str, span_type: &'a str) -> Self {
        Self {
            name,
            span_type,
            is_root: false,
        }
    }

    /// Options for the span wrapping an action call.
    pub const fn action(name: &'a str) -> Self {
        Self::new(name, "action")
    }

    /// Mark the span as the root of a new trace.
    pub const fn root(mut self) -> Self {
        self.is_root = true;
        self
    }
}

/// Final state of a finished span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanState {
    /// The traced call returned a value.
    Success,
    /// The traced call returned an error.
    Error,
}

/// A span that is currently open.
#[derive(Debug)]
pub struct ActiveSpan {
    trace_id: String,
    span_id: String,
    parent_span_id: Option<String>,
    name: String,
    span_type: String,
    path: String,
    is_root: bool,
    started_at: DateTime<Utc>,
    custom: Mutex<BTreeMap<String, String>>,
}

impl ActiveSpan {
    pub(crate) fn start(parent: Option<&Self>, options: SpanOptions<'_>) -> Self {
        let parent = parent.filter(|_| !options.is_root);
        let segment = format!("/{{{},t:{}}}", options.name, options.span_type);
        let (trace_id, parent_span_id, path) = match parent {
            Some(parent) => (
                parent.trace_id.clone(),
                Some(parent.span_id.clone()),
                format!("{}{segment}", parent.path),
            ),
            None => (uuid::Uuid::new_v4().simple().to_string(), None, segment),
        };

        Self {
            trace_id,
            span_id: new_span_id(),
            parent_span_id,
            name: options.name.to_owned(),
            span_type: options.span_type.to_owned(),
            path,
            is_root: parent.is_none(),
            started_at: Utc::now(),
            custom: Mutex::new(BTreeMap::new()),
        }
    }

    /// Identifier shared by every span of the trace.
    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    /// Identifier of this span.
    pub fn span_id(&self) -> &str {
        &self.span_id
    }

    /// Identifier of the enclosing span, if any.
    pub fn parent_span_id(&self) -> Option<&str> {
        self.parent_span_id.as_deref()
    }

    /// Span name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Span type.
    pub fn span_type(&self) -> &str {
        &self.span_type
    }

    /// Path from the trace root, e.g. `/{outer,t:flow}/{inner,t:action}`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether this span started its trace.
    pub fn is_root(&self) -> bool {
        self.is_root
    }

    /// Attach a custom attribute, replacing any previous value for `key`.
    pub fn set_custom_attr(&self, key: impl Into<String>, value: impl Into<String>) {
        self.custom.lock().insert(key.into(), value.into());
    }

    /// Current value of a custom attribute.
    pub fn custom_attr(&self, key: &str) -> Option<String> {
        self.custom.lock().get(key).cloned()
    }

    pub(crate) fn finish(
        &self,
        input: Value,
        output: Value,
        error: Option<String>,
    ) -> SpanRecord {
        SpanRecord {
            trace_id: self.trace_id.clone(),
            span_id: self.span_id.clone(),
            parent_span_id: self.parent_span_id.clone(),
            name: self.name.clone(),
            span_type: self.span_type.clone(),
            path: self.path.clone(),
            is_root: self.is_root,
            input,
            output,
            state: if error.is_some() {
                SpanState::Error
            } else {
                SpanState::Success
            },
            error,
            custom: self.custom.lock().clone(),
            start_time: self.started_at,
            end_time: Utc::now(),
        }
    }
}

/// Serializable record of a finished span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanRecord {
    /// Trace identifier.
    pub trace_id: String,
    /// Span identifier.
    pub span_id: String,
    /// Enclosing span, absent for root spans.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<String>,
    /// Span name.
    pub name: String,
    /// Span type.
    pub span_type: String,
    /// Path from the trace root.
    pub path: String,
    /// Whether this span started its trace.
    pub is_root: bool,
    /// Recorded input.
    pub input: Value,
    /// Recorded output, `null` on error.
    pub output: Value,
    /// Final state.
    pub state: SpanState,
    /// Error message when `state` is [`SpanState::Error`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Custom attributes set while the span was open.
    #[serde(default)]
    pub custom: BTreeMap<String, String>,
    /// Start time.
    pub start_time: DateTime<Utc>,
    /// End time.
    pub end_time: DateTime<Utc>,
}

fn new_span_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id[..16].to_owned()
}
