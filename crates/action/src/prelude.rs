//! Convenience re-exports for action authors.
//!
//! ```rust
//! use ember_action::prelude::*;
//! ```

pub use crate::action::Action;
pub use crate::context::ActionContext;
pub use crate::descriptor::ActionDescriptor;
pub use crate::error::ActionError;
pub use crate::handler::ErasedAction;
pub use crate::streaming::{NoStream, StreamingCallback};

pub use ember_core::{ActionKind, Metadata};
pub use ember_schema::JsonSchema;
