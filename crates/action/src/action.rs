use std::fmt;
use std::future::Future;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use ember_core::{ActionKey, ActionKeyError, ActionKind, Metadata};
use ember_schema::{JsonSchema, Schema, infer_schema};
use ember_telemetry::{SpanOptions, TracingState, to_span_value};
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Serialize;

use crate::context::ActionContext;
use crate::descriptor::ActionDescriptor;
use crate::error::ActionError;
use crate::streaming::{NoStream, StreamingCallback};

type ActionFuture<Out> = BoxFuture<'static, Result<Out, ActionError>>;
type ActionFn<In, Out, S> =
    dyn Fn(ActionContext, In, StreamingCallback<S>) -> ActionFuture<Out> + Send + Sync;

/// A named, observable operation.
///
/// Wraps a function taking `In` and returning `Out`, optionally emitting
/// values of type `S` through a [`StreamingCallback`] before it returns.
/// Input and output schemas are derived once at construction.
///
/// Every [`run`](Self::run) opens a new trace span and records exactly one
/// success or failure measurement.
///
/// # Examples
///
/// ```
/// use ember_action::{Action, ActionContext, StreamingCallback};
/// use ember_core::ActionKind;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let shout = Action::new("shout", ActionKind::Util, None, |_ctx, s: String| async move {
///     Ok(s.to_uppercase())
/// });
///
/// let out = shout
///     .run(&ActionContext::new(), "hi".to_owned(), StreamingCallback::none())
///     .await
///     .unwrap();
/// assert_eq!(out, "HI");
/// # }
/// ```
pub struct Action<In, Out, S = NoStream> {
    name: String,
    kind: ActionKind,
    description: Option<String>,
    metadata: Option<Metadata>,
    input_schema: Schema,
    output_schema: Schema,
    func: Arc<ActionFn<In, Out, S>>,
    tracing: OnceLock<Arc<TracingState>>,
}

impl<In, Out> Action<In, Out, NoStream>
where
    In: JsonSchema + Serialize + fmt::Debug + Send + 'static,
    Out: JsonSchema + Serialize + fmt::Debug + Send + 'static,
{
    /// Create a non-streaming action.
    pub fn new<F, Fut>(
        name: impl Into<String>,
        kind: ActionKind,
        metadata: Option<Metadata>,
        f: F,
    ) -> Self
    where
        F: Fn(ActionContext, In) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Out, ActionError>> + Send + 'static,
    {
        Self::streaming(name, kind, metadata, move |ctx, input, _cb: StreamingCallback<NoStream>| {
            f(ctx, input)
        })
    }
}

impl<In, Out, S> Action<In, Out, S>
where
    In: JsonSchema + Serialize + fmt::Debug + Send + 'static,
    Out: JsonSchema + Serialize + fmt::Debug + Send + 'static,
    S: Send + 'static,
{
    /// Create an action whose function may emit intermediate values.
    pub fn streaming<F, Fut>(
        name: impl Into<String>,
        kind: ActionKind,
        metadata: Option<Metadata>,
        f: F,
    ) -> Self
    where
        F: Fn(ActionContext, In, StreamingCallback<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Out, ActionError>> + Send + 'static,
    {
        let subtype = kind.as_str();
        let func: Arc<ActionFn<In, Out, S>> =
            Arc::new(move |ctx: ActionContext, input: In, cb: StreamingCallback<S>| {
                ctx.set_custom_metadata_attr("subtype", subtype);
                f(ctx, input, cb).boxed()
            });

        Self {
            name: name.into(),
            kind,
            description: None,
            metadata,
            input_schema: infer_schema::<In>(),
            output_schema: infer_schema::<Out>(),
            func,
            tracing: OnceLock::new(),
        }
    }

    /// Execute the function in a new span nested under the caller's span.
    ///
    /// Latency is measured around the function call only. On failure the
    /// function's error is returned unchanged.
    pub async fn run(
        &self,
        ctx: &ActionContext,
        input: In,
        cb: StreamingCallback<S>,
    ) -> Result<Out, ActionError> {
        tracing::debug!(action = %self.name, input = ?input, "Action.run");

        let state = self.tracing_state();
        let meter = state.meter();
        let name = self.name.as_str();
        let span_input = to_span_value(&input);

        let result = state
            .run_in_new_span(
                ctx.span().map(|span| &**span),
                SpanOptions::action(name),
                span_input,
                |span| {
                    let ctx = ctx.child(span);
                    let func = Arc::clone(&self.func);
                    async move {
                        let start = Instant::now();
                        let result = func(ctx, input, cb).await;
                        let latency = start.elapsed();
                        match &result {
                            Ok(_) => meter.record_success(name, latency),
                            Err(err) => meter.record_failure(name, latency, err.kind(), err),
                        }
                        result
                    }
                },
            )
            .await;

        tracing::debug!(
            action = %self.name,
            output = ?result.as_ref().ok(),
            error = ?result.as_ref().err(),
            "Action.run"
        );
        result
    }
}

impl<In, Out, S> Action<In, Out, S> {
    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Action name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Action category.
    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    /// Registry key `/{kind}/{name}`.
    pub fn key(&self) -> Result<ActionKey, ActionKeyError> {
        ActionKey::new(self.kind, self.name.clone())
    }

    /// Free-text description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Metadata as supplied at construction.
    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    /// Schema derived from `In`.
    pub fn input_schema(&self) -> &Schema {
        &self.input_schema
    }

    /// Schema derived from `Out`.
    pub fn output_schema(&self) -> &Schema {
        &self.output_schema
    }

    /// Attach the tracing state used by every later run.
    ///
    /// Can be set once; returns `false` if a state was already attached.
    pub fn attach_tracing(&self, state: Arc<TracingState>) -> bool {
        let attached = self.tracing.set(state).is_ok();
        if !attached {
            tracing::warn!(action = %self.name, "tracing state already attached");
        }
        attached
    }

    /// The attached tracing state, or the process-wide default.
    pub fn tracing_state(&self) -> Arc<TracingState> {
        self.tracing
            .get()
            .cloned()
            .unwrap_or_else(ember_telemetry::global)
    }

    /// Snapshot for listing. The key is left for the registry to set.
    pub fn descriptor(&self) -> ActionDescriptor {
        ActionDescriptor {
            key: None,
            name: self.name.clone(),
            description: self.description.clone(),
            metadata: self
                .metadata
                .clone()
                .unwrap_or_else(ActionDescriptor::placeholder_metadata),
            input_schema: Some(self.input_schema.clone()),
            output_schema: Some(self.output_schema.clone()),
        }
    }
}

impl<In, Out, S> fmt::Debug for Action<In, Out, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("description", &self.description)
            .field("tracing_attached", &self.tracing.get().is_some())
            .finish_non_exhaustive()
    }
}
