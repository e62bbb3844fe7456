use std::error::Error as StdError;
use std::sync::Arc;

/// Shared, type-erased error produced by an action's function.
pub type BoxError = Arc<dyn StdError + Send + Sync>;

/// Error type for all action operations.
///
/// Every variant surfaces the underlying error text unchanged. The core never
/// retries, suppresses or reclassifies a failure; callers decide what to do
/// with it.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum ActionError {
    /// Encoded input could not be decoded into the action's input type.
    /// The function was not invoked.
    #[error(transparent)]
    Decode(Arc<serde_json::Error>),

    /// An output or stream chunk could not be encoded.
    #[error(transparent)]
    Encode(Arc<serde_json::Error>),

    /// The action's function failed.
    #[error(transparent)]
    Execution(BoxError),

    /// Execution cancelled via cancellation token.
    #[error("cancelled")]
    Cancelled,
}

impl ActionError {
    /// Create an execution error from a message.
    pub fn execution(msg: impl Into<String>) -> Self {
        let boxed: Box<dyn StdError + Send + Sync> = msg.into().into();
        Self::Execution(Arc::from(boxed))
    }

    /// Wrap an arbitrary error as an execution error.
    pub fn from_source<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Execution(Arc::new(err))
    }

    /// Create a decode error.
    pub fn decode(err: serde_json::Error) -> Self {
        Self::Decode(Arc::new(err))
    }

    /// Create an encode error.
    pub fn encode(err: serde_json::Error) -> Self {
        Self::Encode(Arc::new(err))
    }

    /// Stable, low-cardinality label for this error, used in measurements.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode",
            Self::Encode(_) => "encode",
            Self::Execution(_) => "execution",
            Self::Cancelled => "cancelled",
        }
    }

    /// The function's own error, if this is an execution failure.
    pub fn execution_source(&self) -> Option<&BoxError> {
        match self {
            Self::Execution(err) => Some(err),
            _ => None,
        }
    }

    /// Downcast the function's own error to a concrete type.
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.execution_source()?.downcast_ref::<E>()
    }

    /// Returns `true` if execution was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
