//! # Ember Schema
//!
//! Derives structural JSON schemas for the input and output types of
//! actions.
//!
//! Schemas come from [`schemars::JsonSchema`] and are shaped for tooling
//! that only understands older dialects and does not resolve references:
//!
//! - zero-field composites (`()`, unit structs, `struct Empty {}`) map to
//!   the `null` schema, the marker for "no meaningful payload";
//! - every other type is inlined at the top level, nested types included;
//! - the `$schema` dialect marker is removed.
//!
//! ```rust
//! use ember_schema::{infer_schema, is_null_schema};
//!
//! assert!(is_null_schema(&infer_schema::<()>()));
//! assert_eq!(infer_schema::<String>().get("type").unwrap(), "string");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use schemars::generate::SchemaSettings;
use serde_json::{Map, Value};

pub use schemars::{JsonSchema, Schema};

/// Infer the structural schema of `T`.
///
/// Pure and deterministic; callers compute it once and cache the result.
pub fn infer_schema<T: JsonSchema + ?Sized>() -> Schema {
    let mut schema = SchemaSettings::draft07()
        .with(|settings| settings.inline_subschemas = true)
        .into_generator()
        .into_root_schema_for::<T>();

    if is_empty_composite(&schema) {
        return null_schema();
    }

    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
    }
    schema
}

/// The `{"type": "null"}` schema used for void payloads.
pub fn null_schema() -> Schema {
    schemars::json_schema!({ "type": "null" })
}

/// Returns `true` if `schema` is exactly the void marker produced by
/// [`null_schema`].
pub fn is_null_schema(schema: &Schema) -> bool {
    schema
        .as_object()
        .is_some_and(|object| object.len() == 1 && object.get("type") == Some(&Value::from("null")))
}

/// A schema describing a value that can carry no data: either `null`
/// outright, or an object with no properties that admits no extra keys.
fn is_empty_composite(schema: &Schema) -> bool {
    let Some(object) = schema.as_object() else {
        return false;
    };
    match object.get("type").and_then(Value::as_str) {
        Some("null") => true,
        Some("object") => {
            let no_properties = object
                .get("properties")
                .and_then(Value::as_object)
                .is_none_or(Map::is_empty);
            let closed = matches!(
                object.get("additionalProperties"),
                None | Some(Value::Bool(false))
            );
            no_properties && closed && !object.contains_key("patternProperties")
        }
        _ => false,
    }
}
