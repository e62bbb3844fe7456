use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors from parsing an [`ActionKind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action kind `{0}`")]
pub struct ActionKindError(pub String);

/// Category of an action.
///
/// The set is closed: registries, trace viewers and key formats all rely on
/// the exact wire names returned by [`ActionKind::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    /// Chat-style language model.
    ChatLlm,
    /// Completion-style language model.
    TextLlm,
    /// Generative model with the unified generate contract.
    Model,
    /// Tool a model may call.
    Tool,
    /// User-defined multi-step flow.
    Flow,
    /// Document retriever.
    Retriever,
    /// Document indexer.
    Indexer,
    /// Embedding model.
    Embedder,
    /// Evaluation metric.
    Evaluator,
    /// Prompt template.
    Prompt,
    /// Internal helper action.
    Util,
    /// Anything else.
    Custom,
}

impl ActionKind {
    /// Every kind, in declaration order.
    pub const ALL: [ActionKind; 12] = [
        Self::ChatLlm,
        Self::TextLlm,
        Self::Model,
        Self::Tool,
        Self::Flow,
        Self::Retriever,
        Self::Indexer,
        Self::Embedder,
        Self::Evaluator,
        Self::Prompt,
        Self::Util,
        Self::Custom,
    ];

    /// Wire name of this kind (e.g. `"chat-llm"`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ChatLlm => "chat-llm",
            Self::TextLlm => "text-llm",
            Self::Model => "model",
            Self::Tool => "tool",
            Self::Flow => "flow",
            Self::Retriever => "retriever",
            Self::Indexer => "indexer",
            Self::Embedder => "embedder",
            Self::Evaluator => "evaluator",
            Self::Prompt => "prompt",
            Self::Util => "util",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = ActionKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ActionKindError(s.to_owned()))
    }
}
