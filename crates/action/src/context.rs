use std::sync::Arc;
use std::time::{Duration, Instant};

use ember_telemetry::ActiveSpan;
use tokio_util::sync::CancellationToken;

use crate::error::ActionError;

/// Runtime context passed to every action invocation.
///
/// Carries the caller's cancellation token and optional deadline, which the
/// core forwards but never enforces, and the span of the enclosing traced
/// call so nested actions join the same trace.
///
/// Actions **should** call [`check_cancelled`](Self::check_cancelled) in
/// long-running loops to support cooperative cancellation.
#[derive(Clone, Default)]
pub struct ActionContext {
    /// Cancellation signal, checked cooperatively by actions.
    pub cancellation: CancellationToken,
    deadline: Option<Instant>,
    span: Option<Arc<ActiveSpan>>,
}

impl ActionContext {
    /// Create a context with a fresh cancellation token and no parent span.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a pre-existing cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Set the caller's deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// The caller's deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left until the deadline, zero once it has passed.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Check whether execution has been cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Cancelled`] if the token has been triggered.
    pub fn check_cancelled(&self) -> Result<(), ActionError> {
        if self.cancellation.is_cancelled() {
            Err(ActionError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// The span of the traced call this context belongs to.
    pub fn span(&self) -> Option<&Arc<ActiveSpan>> {
        self.span.as_ref()
    }

    /// Set a custom attribute on the current span. No-op outside a span.
    pub fn set_custom_metadata_attr(&self, key: &str, value: &str) {
        if let Some(span) = &self.span {
            span.set_custom_attr(key, value);
        }
    }

    pub(crate) fn child(&self, span: Arc<ActiveSpan>) -> Self {
        Self {
            cancellation: self.cancellation.clone(),
            deadline: self.deadline,
            span: Some(span),
        }
    }
}

impl std::fmt::Debug for ActionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionContext")
            .field("cancelled", &self.cancellation.is_cancelled())
            .field("deadline", &self.deadline)
            .field("span", &self.span.as_ref().map(|span| span.path()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_cancelled_follows_token() {
        let token = CancellationToken::new();
        let ctx = ActionContext::new().with_cancellation(token.clone());
        assert!(ctx.check_cancelled().is_ok());

        token.cancel();
        assert!(ctx.is_cancelled());
        assert!(matches!(ctx.check_cancelled(), Err(ActionError::Cancelled)));
    }

    #[test]
    fn remaining_saturates_at_zero() {
        let ctx = ActionContext::new().with_deadline(Instant::now());
        std::thread::sleep(Duration::from_millis(1));
        assert_eq!(ctx.remaining(), Some(Duration::ZERO));
        assert_eq!(ActionContext::new().remaining(), None);
    }

    #[test]
    fn custom_attr_without_span_is_noop() {
        let ctx = ActionContext::new();
        ctx.set_custom_metadata_attr("subtype", "tool");
        assert!(ctx.span().is_none());
    }
}
