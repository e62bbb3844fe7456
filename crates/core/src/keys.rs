use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::kind::{ActionKind, ActionKindError};

/// Errors from constructing an [`ActionKey`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionKeyError {
    /// The action name was empty or contained only whitespace.
    #[error("action name cannot be empty or whitespace")]
    EmptyName,
    /// The action name has leading or trailing whitespace.
    #[error("action name `{0}` has surrounding whitespace")]
    UntrimmedName(String),
    /// The key does not have the `/{kind}/{name}` shape.
    #[error("action key `{0}` is not of the form /{{kind}}/{{name}}")]
    Malformed(String),
    /// The kind segment is not a known [`ActionKind`].
    #[error(transparent)]
    Kind(#[from] ActionKindError),
}

/// Registry key of an action: `/{kind}/{name}`.
///
/// Names may themselves contain `/` (e.g. `"acme/gemini-pro"`), so parsing
/// splits on the first separator after the kind only.
///
/// # Examples
///
/// ```
/// use ember_core::{ActionKey, ActionKind};
///
/// let key = ActionKey::new(ActionKind::Model, "acme/gemini-pro").unwrap();
/// assert_eq!(key.to_string(), "/model/acme/gemini-pro");
///
/// let parsed: ActionKey = "/model/acme/gemini-pro".parse().unwrap();
/// assert_eq!(parsed, key);
/// ```
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActionKey {
    kind: ActionKind,
    name: String,
}

impl ActionKey {
    /// Create a key from its kind and name.
    pub fn new(kind: ActionKind, name: impl Into<String>) -> Result<Self, ActionKeyError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ActionKeyError::EmptyName);
        }
        if name.trim() != name {
            return Err(ActionKeyError::UntrimmedName(name));
        }
        Ok(Self { kind, name })
    }

    /// The action kind segment.
    #[inline]
    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    /// The action name segment.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.kind, self.name)
    }
}

impl FromStr for ActionKey {
    type Err = ActionKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, name) = s
            .strip_prefix('/')
            .and_then(|rest| rest.split_once('/'))
            .ok_or_else(|| ActionKeyError::Malformed(s.to_owned()))?;
        Self::new(kind.parse()?, name)
    }
}

impl TryFrom<String> for ActionKey {
    type Error = ActionKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ActionKey> for String {
    fn from(key: ActionKey) -> Self {
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn formats_kind_then_name() {
        let key = ActionKey::new(ActionKind::Flow, "summarize").unwrap();
        assert_eq!(key.to_string(), "/flow/summarize");
        assert_eq!(key.kind(), ActionKind::Flow);
        assert_eq!(key.name(), "summarize");
    }

    #[test]
    fn name_may_contain_separator() {
        let key: ActionKey = "/retriever/docs/menu".parse().unwrap();
        assert_eq!(key.kind(), ActionKind::Retriever);
        assert_eq!(key.name(), "docs/menu");
    }

    #[test]
    fn rejects_empty_name() {
        assert_eq!(
            ActionKey::new(ActionKind::Tool, "  "),
            Err(ActionKeyError::EmptyName)
        );
    }

    #[test]
    fn rejects_untrimmed_name() {
        assert!(matches!(
            ActionKey::new(ActionKind::Tool, " lookup"),
            Err(ActionKeyError::UntrimmedName(_))
        ));
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(matches!(
            "model/gemini".parse::<ActionKey>(),
            Err(ActionKeyError::Malformed(_))
        ));
        assert!(matches!(
            "/model".parse::<ActionKey>(),
            Err(ActionKeyError::Malformed(_))
        ));
        assert!(matches!(
            "/lambda/x".parse::<ActionKey>(),
            Err(ActionKeyError::Kind(_))
        ));
    }

    #[test]
    fn serde_uses_string_form() {
        let key = ActionKey::new(ActionKind::Model, "echo").unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"/model/echo\"");
        let back: ActionKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
