//! Streaming callbacks.

use std::fmt;
use std::sync::Arc;

use crate::context::ActionContext;
use crate::error::ActionError;

/// Stream element type of actions that do not stream.
pub type NoStream = ();

type ChunkFn<S> = dyn Fn(&ActionContext, S) -> Result<(), ActionError> + Send + Sync;

/// Receiver for incremental values an action emits before its final output.
///
/// Calls are synchronous and happen in emission order, all before the
/// action returns. An error returned from the receiver is handed back to the
/// action, which decides whether to abort.
pub enum StreamingCallback<S> {
    /// The caller does not want intermediate values.
    Disabled,
    /// Intermediate values are forwarded to the wrapped function.
    Enabled(Arc<ChunkFn<S>>),
}

impl<S> StreamingCallback<S> {
    /// Wrap a receiver function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&ActionContext, S) -> Result<(), ActionError> + Send + Sync + 'static,
    {
        Self::Enabled(Arc::new(f))
    }

    /// A callback that drops every value.
    pub const fn none() -> Self {
        Self::Disabled
    }

    /// Whether the caller asked for intermediate values.
    pub fn is_streaming(&self) -> bool {
        matches!(self, Self::Enabled(_))
    }

    /// Forward one value. Returns `Ok(())` without doing anything when
    /// disabled.
    pub fn send(&self, ctx: &ActionContext, chunk: S) -> Result<(), ActionError> {
        match self {
            Self::Disabled => Ok(()),
            Self::Enabled(f) => f(ctx, chunk),
        }
    }
}

impl<S: 'static> StreamingCallback<S> {
    /// Build a callback for values of type `T` that converts each value with
    /// `convert` before forwarding it here.
    ///
    /// A conversion failure aborts that single call and is returned to the
    /// sender. Disabled stays disabled.
    pub fn map_chunks<T, F>(self, convert: F) -> StreamingCallback<T>
    where
        T: 'static,
        F: Fn(T) -> Result<S, ActionError> + Send + Sync + 'static,
    {
        match self {
            Self::Disabled => StreamingCallback::Disabled,
            Self::Enabled(inner) => StreamingCallback::new(move |ctx: &ActionContext, chunk: T| {
                inner(ctx, convert(chunk)?)
            }),
        }
    }
}

impl<S> Default for StreamingCallback<S> {
    fn default() -> Self {
        Self::Disabled
    }
}

impl<S> Clone for StreamingCallback<S> {
    fn clone(&self) -> Self {
        match self {
            Self::Disabled => Self::Disabled,
            Self::Enabled(f) => Self::Enabled(Arc::clone(f)),
        }
    }
}

impl<S> fmt::Debug for StreamingCallback<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disabled => "StreamingCallback::Disabled",
            Self::Enabled(_) => "StreamingCallback::Enabled",
        })
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;

    #[test]
    fn disabled_send_is_noop() {
        let cb = StreamingCallback::<u32>::none();
        assert!(!cb.is_streaming());
        assert!(cb.send(&ActionContext::new(), 1).is_ok());
    }

    #[test]
    fn enabled_forwards_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let cb = StreamingCallback::new(move |_: &ActionContext, n: u32| {
            sink.lock().push(n);
            Ok(())
        });

        let ctx = ActionContext::new();
        for n in 1..=3 {
            cb.send(&ctx, n).unwrap();
        }
        assert_eq!(*seen.lock(), vec![1, 2, 3]);
    }

    #[test]
    fn conversion_failure_aborts_single_call() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let cb = StreamingCallback::new(move |_: &ActionContext, s: String| {
            sink.lock().push(s);
            Ok(())
        })
        .map_chunks(|n: i32| {
            if n < 0 {
                Err(ActionError::execution("negative"))
            } else {
                Ok(n.to_string())
            }
        });

        let ctx = ActionContext::new();
        assert!(cb.send(&ctx, 1).is_ok());
        assert_eq!(cb.send(&ctx, -1).unwrap_err().to_string(), "negative");
        assert!(cb.send(&ctx, 2).is_ok());
        assert_eq!(*seen.lock(), vec!["1".to_owned(), "2".to_owned()]);
    }

    #[test]
    fn map_keeps_disabled() {
        let cb = StreamingCallback::<String>::Disabled.map_chunks(|n: i32| Ok(n.to_string()));
        assert!(!cb.is_streaming());
    }
}
