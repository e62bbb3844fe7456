//! # Ember AI
//!
//! Model-facing types and structured-output checking.
//!
//! A model is an ordinary [`ember_action::Action`] from [`GenerateRequest`]
//! to [`GenerateResponse`] that streams [`GenerateResponseChunk`]s. Callers
//! describe the output they expect with an [`OutputContract`];
//! [`validate_candidate`] checks one [`Candidate`] against it and
//! [`generate`] runs a model and keeps the first candidate that passes.
//!
//! ```rust
//! use ember_ai::{Candidate, Message, OutputContract, validate_candidate};
//! use serde_json::json;
//!
//! let contract = OutputContract::json().with_schema(json!({
//!     "type": "object",
//!     "required": ["city"],
//!     "properties": { "city": { "type": "string" } }
//! }));
//!
//! let reply = Candidate::new(0, Message::model("```json\n{\"city\": \"Oslo\"}\n```"));
//! let valid = validate_candidate(reply, &contract).unwrap();
//! assert_eq!(valid.text(), r#"{"city": "Oslo"}"#);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod extract;
mod generate;
mod model;
mod output;
mod validate;

pub use extract::strip_code_fence;
pub use generate::{GenerateError, ModelAction, define_model, generate};
pub use model::{
    Candidate, FinishReason, GenerateRequest, GenerateResponse, GenerateResponseChunk,
    GenerationUsage, Media, Message, Part, Role, ToolDefinition,
};
pub use output::{OutputContract, OutputFormat};
pub use validate::{ContractError, validate_candidate};
