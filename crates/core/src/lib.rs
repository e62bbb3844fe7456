//! # Ember Core
//!
//! Types shared by every Ember crate.
//!
//! ## Key Components
//!
//! - **Kinds**: [`ActionKind`], the closed set of action categories
//! - **Keys**: [`ActionKey`], the `/{kind}/{name}` identity a registry assigns
//!
//! ## Usage
//!
//! ```rust
//! use ember_core::{ActionKey, ActionKind};
//!
//! let key = ActionKey::new(ActionKind::Tool, "weather").unwrap();
//! assert_eq!(key.to_string(), "/tool/weather");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod keys;
mod kind;

pub use keys::{ActionKey, ActionKeyError};
pub use kind::{ActionKind, ActionKindError};

/// Free-form action metadata: string keys to arbitrary JSON-like values.
pub type Metadata = serde_json::Map<String, serde_json::Value>;
