use ember_core::{ActionKey, Metadata};
use ember_schema::Schema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Serializable snapshot of an action, as listed by a registry or devtools.
///
/// Two descriptors are equal when key, name, description and metadata match.
/// Schemas are derived from types and are not compared.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDescriptor {
    /// Registry key, set by whoever registers the action.
    #[serde(default)]
    pub key: Option<ActionKey>,
    /// Action name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Action metadata, or the schema placeholders when none was supplied.
    #[serde(default)]
    pub metadata: Metadata,
    /// Schema of the input type.
    #[serde(default)]
    pub input_schema: Option<Schema>,
    /// Schema of the output type.
    #[serde(default)]
    pub output_schema: Option<Schema>,
}

impl ActionDescriptor {
    /// Set the registry key.
    pub fn with_key(mut self, key: ActionKey) -> Self {
        self.key = Some(key);
        self
    }

    /// Metadata exposed when an action was built without any:
    /// `{"inputSchema": null, "outputSchema": null}`.
    pub fn placeholder_metadata() -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert("inputSchema".to_owned(), Value::Null);
        metadata.insert("outputSchema".to_owned(), Value::Null);
        metadata
    }
}

impl PartialEq for ActionDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && self.name == other.name
            && self.description == other.description
            && self.metadata == other.metadata
    }
}

#[cfg(test)]
mod tests {
    use ember_core::ActionKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn descriptor() -> ActionDescriptor {
        ActionDescriptor {
            key: None,
            name: "echo".into(),
            description: Some("repeats input".into()),
            metadata: ActionDescriptor::placeholder_metadata(),
            input_schema: Some(ember_schema::infer_schema::<String>()),
            output_schema: Some(ember_schema::infer_schema::<String>()),
        }
    }

    #[test]
    fn schemas_do_not_affect_equality() {
        let mut other = descriptor();
        other.input_schema = Some(ember_schema::infer_schema::<u64>());
        other.output_schema = None;
        assert_eq!(descriptor(), other);
    }

    #[test]
    fn metadata_and_key_affect_equality() {
        let mut other = descriptor();
        other.metadata.insert("version".into(), json!(2));
        assert_ne!(descriptor(), other);

        let key = ActionKey::new(ActionKind::Util, "echo").unwrap();
        assert_ne!(descriptor(), descriptor().with_key(key.clone()));
        assert_eq!(descriptor().with_key(key.clone()), descriptor().with_key(key));
    }

    #[test]
    fn serializes_camel_case_with_placeholders() {
        let key = ActionKey::new(ActionKind::Util, "echo").unwrap();
        let value = serde_json::to_value(descriptor().with_key(key)).unwrap();

        assert_eq!(value["key"], "/util/echo");
        assert_eq!(value["metadata"], json!({ "inputSchema": null, "outputSchema": null }));
        assert_eq!(value["inputSchema"]["type"], "string");
        assert!(value.get("input_schema").is_none());
    }
}
