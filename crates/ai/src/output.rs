//! Output contracts declared by callers.

use ember_schema::{JsonSchema, infer_schema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Expected format of a model's output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// No format requested.
    #[default]
    Unspecified,
    /// Free-form text.
    Text,
    /// JSON, optionally constrained by a schema.
    Json,
    /// One value out of a fixed set.
    Enum,
    /// Any format this crate does not check.
    #[serde(other)]
    Other,
}

/// A caller's declaration of what a valid response looks like.
///
/// Serialized as `{"format": "...", "schema": {...}}` with `schema`
/// omitted when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OutputContract {
    /// Expected format.
    #[serde(default)]
    pub format: OutputFormat,
    /// Schema the decoded output must satisfy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
}

impl OutputContract {
    /// Free-form text.
    pub fn text() -> Self {
        Self {
            format: OutputFormat::Text,
            schema: None,
        }
    }

    /// Any well-formed JSON.
    pub fn json() -> Self {
        Self {
            format: OutputFormat::Json,
            schema: None,
        }
    }

    /// JSON matching the schema derived from `T`.
    pub fn json_for<T: JsonSchema + ?Sized>() -> Self {
        Self::json().with_schema(infer_schema::<T>().to_value())
    }

    /// One of `values`.
    pub fn one_of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let values: Vec<Value> = values.into_iter().map(|v| Value::String(v.into())).collect();
        Self {
            format: OutputFormat::Enum,
            schema: Some(serde_json::json!({ "type": "string", "enum": values })),
        }
    }

    /// Constrain the output with `schema`.
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    /// The format used when talking to a model: an unspecified format with
    /// a schema means JSON, without one it means text.
    pub fn effective_format(&self) -> OutputFormat {
        match (self.format, &self.schema) {
            (OutputFormat::Unspecified, Some(_)) => OutputFormat::Json,
            (OutputFormat::Unspecified, None) => OutputFormat::Text,
            (format, _) => format,
        }
    }
}
