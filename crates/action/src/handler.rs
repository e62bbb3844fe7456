//! Type-erased action handler.
//!
//! Lets callers hold actions of different `In`/`Out`/`S` types in one
//! collection and invoke them with encoded JSON payloads.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use ember_core::ActionKind;
use ember_schema::{JsonSchema, Schema};
use ember_telemetry::TracingState;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::action::Action;
use crate::context::ActionContext;
use crate::descriptor::ActionDescriptor;
use crate::error::ActionError;
use crate::streaming::StreamingCallback;

/// Non-generic view of an [`Action`].
///
/// Implemented for every `Action<In, Out, S>` whose types can be encoded;
/// registries and devtools hold `Arc<dyn ErasedAction>`.
#[async_trait]
pub trait ErasedAction: Send + Sync + 'static {
    /// Action name.
    fn name(&self) -> &str;

    /// Action category.
    fn kind(&self) -> ActionKind;

    /// Serializable snapshot without a key.
    fn descriptor(&self) -> ActionDescriptor;

    /// Schema of the input type.
    fn input_schema(&self) -> &Schema;

    /// Schema of the output type.
    fn output_schema(&self) -> &Schema;

    /// Attach the tracing state used by every later run. Returns `false` if
    /// one was already attached.
    fn attach_tracing(&self, state: Arc<TracingState>) -> bool;

    /// Decode `input`, run the action and encode its output.
    ///
    /// Each streamed chunk is encoded before it reaches `cb`. A decode
    /// failure returns [`ActionError::Decode`] without running the action.
    async fn invoke_encoded(
        &self,
        ctx: &ActionContext,
        input: &[u8],
        cb: StreamingCallback<Bytes>,
    ) -> Result<Bytes, ActionError>;
}

#[async_trait]
impl<In, Out, S> ErasedAction for Action<In, Out, S>
where
    In: DeserializeOwned + JsonSchema + Serialize + fmt::Debug + Send + 'static,
    Out: JsonSchema + Serialize + fmt::Debug + Send + 'static,
    S: Serialize + Send + 'static,
{
    fn name(&self) -> &str {
        Action::name(self)
    }

    fn kind(&self) -> ActionKind {
        Action::kind(self)
    }

    fn descriptor(&self) -> ActionDescriptor {
        Action::descriptor(self)
    }

    fn input_schema(&self) -> &Schema {
        Action::input_schema(self)
    }

    fn output_schema(&self) -> &Schema {
        Action::output_schema(self)
    }

    fn attach_tracing(&self, state: Arc<TracingState>) -> bool {
        Action::attach_tracing(self, state)
    }

    async fn invoke_encoded(
        &self,
        ctx: &ActionContext,
        input: &[u8],
        cb: StreamingCallback<Bytes>,
    ) -> Result<Bytes, ActionError> {
        let input: In = serde_json::from_slice(input).map_err(ActionError::decode)?;
        let cb = cb.map_chunks(|chunk: S| encode(&chunk));
        let output = self.run(ctx, input, cb).await?;
        encode(&output)
    }
}

impl<In, Out, S> Action<In, Out, S>
where
    Self: ErasedAction,
{
    /// Box this action behind the type-erased interface.
    pub fn into_erased(self) -> Arc<dyn ErasedAction> {
        Arc::new(self)
    }
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Bytes, ActionError> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(ActionError::encode)
}

impl fmt::Debug for dyn ErasedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedAction")
            .field("name", &self.name())
            .field("kind", &self.kind())
            .finish()
    }
}
