//! Request and response types exchanged with model actions.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::extract::strip_code_fence;
use crate::output::OutputContract;

/// Author of a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions.
    System,
    /// End-user input.
    #[default]
    User,
    /// Model output.
    Model,
    /// Tool results fed back to the model.
    Tool,
}

/// Media reference carried by a [`Part`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    /// Location of the media, often a `data:` URL.
    pub url: String,
    /// MIME type, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// One piece of message content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Part {
    /// Plain text.
    Text {
        /// The text.
        text: String,
    },
    /// Image, audio or other binary media.
    Media {
        /// The media reference.
        media: Media,
    },
    /// Arbitrary structured data.
    Data {
        /// The data.
        data: Value,
    },
}

impl Part {
    /// A text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// A media part.
    pub fn media(url: impl Into<String>, content_type: Option<String>) -> Self {
        Self::Media {
            media: Media {
                url: url.into(),
                content_type,
            },
        }
    }

    /// The text of a text part.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }
}

fn concat_text(parts: &[Part]) -> String {
    parts.iter().filter_map(Part::as_text).collect()
}

fn parse_output<T: DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(strip_code_fence(text))
}

/// A message in a conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Message {
    /// Author.
    pub role: Role,
    /// Ordered content.
    #[serde(default)]
    pub content: Vec<Part>,
}

impl Message {
    /// A message holding one text part.
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: vec![Part::text(text)],
        }
    }

    /// A user message holding one text part.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// A model message holding one text part.
    pub fn model(text: impl Into<String>) -> Self {
        Self::new(Role::Model, text)
    }

    /// Text of all text parts, concatenated. Other parts contribute nothing.
    pub fn text(&self) -> String {
        concat_text(&self.content)
    }

    /// Decode the text as JSON, looking inside one enclosing code fence.
    pub fn output<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        parse_output(&self.text())
    }
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FinishReason {
    /// Natural end of output.
    Stop,
    /// Token limit reached.
    Length,
    /// Output withheld by a safety filter.
    Blocked,
    /// Provider-specific reason.
    Other,
    /// Not reported.
    Unknown,
}

/// Token and character accounting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerationUsage {
    /// Tokens in the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    /// Tokens in the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
    /// Tokens overall.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
    /// Provider-specific counters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<Value>,
}

/// One alternative response from a model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Position among the response's candidates.
    #[serde(default)]
    pub index: u32,
    /// The generated message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    /// Why generation stopped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
    /// Provider explanation of the finish reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_message: Option<String>,
    /// Accounting for this candidate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<GenerationUsage>,
    /// Provider-specific data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<Value>,
}

impl Candidate {
    /// A candidate holding `message`.
    pub fn new(index: u32, message: Message) -> Self {
        Self {
            index,
            message: Some(message),
            ..Self::default()
        }
    }

    /// Text of the message, empty when there is none.
    pub fn text(&self) -> String {
        self.message.as_ref().map(Message::text).unwrap_or_default()
    }

    /// Decode the message text as JSON, looking inside one enclosing code
    /// fence.
    pub fn output<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        parse_output(&self.text())
    }
}

/// A tool the model may ask to call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Tool name.
    pub name: String,
    /// Schema of the tool input.
    pub input_schema: Value,
    /// Schema of the tool output.
    #[serde(default)]
    pub output_schema: Value,
}

impl ToolDefinition {
    /// Describe an action as a tool.
    pub fn from_action(action: &dyn ember_action::ErasedAction) -> Self {
        Self {
            name: action.name().to_owned(),
            input_schema: action.input_schema().as_value().clone(),
            output_schema: action.output_schema().as_value().clone(),
        }
    }
}

/// Input to a model action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Conversation so far, prompt last.
    pub messages: Vec<Message>,
    /// Provider-specific generation settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    /// Tools offered to the model.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
    /// Expected shape of the output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputContract>,
    /// Number of candidates to generate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidates: Option<u32>,
}

impl GenerateRequest {
    /// A request with a single user prompt.
    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(text)],
            ..Self::default()
        }
    }

    /// Prepend earlier turns.
    pub fn with_history(mut self, history: impl IntoIterator<Item = Message>) -> Self {
        let mut messages: Vec<Message> = history.into_iter().collect();
        messages.append(&mut self.messages);
        self.messages = messages;
        self
    }

    /// Set provider configuration.
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = Some(config);
        self
    }

    /// Offer a tool.
    pub fn with_tool(mut self, tool: ToolDefinition) -> Self {
        self.tools.push(tool);
        self
    }

    /// Set the output contract.
    pub fn with_output(mut self, output: OutputContract) -> Self {
        self.output = Some(output);
        self
    }

    /// Ask for `n` candidates.
    pub fn with_candidates(mut self, n: u32) -> Self {
        self.candidates = Some(n);
        self
    }
}

/// Output of a model action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    /// Alternatives, in the order the model produced them.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Accounting for the whole request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<GenerationUsage>,
    /// Provider-specific data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<Value>,
}

impl GenerateResponse {
    /// Text of the first candidate, empty when there is none.
    pub fn text(&self) -> String {
        self.candidates.first().map(Candidate::text).unwrap_or_default()
    }

    /// Decode the first candidate's text as JSON.
    pub fn output<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        parse_output(&self.text())
    }
}

/// Incremental output streamed while a model action runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponseChunk {
    /// Candidate this chunk belongs to.
    #[serde(default)]
    pub index: u32,
    /// New content.
    #[serde(default)]
    pub content: Vec<Part>,
    /// Provider-specific data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<Value>,
}

impl GenerateResponseChunk {
    /// A chunk with one text part.
    pub fn text(index: u32, text: impl Into<String>) -> Self {
        Self {
            index,
            content: vec![Part::text(text)],
            custom: None,
        }
    }

    /// Text of the chunk's text parts.
    pub fn chunk_text(&self) -> String {
        concat_text(&self.content)
    }
}
