//! # Ember Action System
//!
//! Named, typed, traceable operations.
//!
//! An [`Action`] wraps a function from `In` to `Out`, optionally emitting
//! intermediate values of a stream type `S`. Schemas for `In` and `Out` are
//! derived once at construction. Every run happens inside a trace span and
//! records exactly one success or failure measurement through
//! `ember-telemetry`.
//!
//! ## Core Types
//!
//! - [`Action`]: generic, strongly-typed callable
//! - [`ErasedAction`]: non-generic view invoked with JSON bytes
//! - [`StreamingCallback`]: receiver for intermediate values
//! - [`ActionContext`]: cancellation, deadline and parent span
//! - [`ActionDescriptor`]: serializable snapshot for listings
//! - [`ActionError`]: decode, encode, execution and cancellation failures
//!
//! ## Quick Start
//!
//! ```rust
//! use ember_action::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let count = Action::streaming(
//!     "count",
//!     ActionKind::Util,
//!     None,
//!     |ctx: ActionContext, n: u32, cb: StreamingCallback<u32>| async move {
//!         for i in 1..=n {
//!             ctx.check_cancelled()?;
//!             cb.send(&ctx, i)?;
//!         }
//!         Ok(n)
//!     },
//! );
//!
//! let erased = count.into_erased();
//! let out = erased
//!     .invoke_encoded(&ActionContext::new(), b"3", StreamingCallback::none())
//!     .await
//!     .unwrap();
//! assert_eq!(&out[..], b"3");
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod action;
mod context;
mod descriptor;
mod error;
mod handler;
/// Convenience re-exports for action authors.
pub mod prelude;
mod streaming;

pub use action::Action;
pub use context::ActionContext;
pub use descriptor::ActionDescriptor;
pub use error::{ActionError, BoxError};
pub use handler::ErasedAction;
pub use streaming::{NoStream, StreamingCallback};
