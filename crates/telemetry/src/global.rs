//! Process-wide default tracing state.
//!
//! Actions without an attached [`TracingState`] fall back to the one
//! installed here. Until something is installed the default is a state with
//! no trace stores and its own metrics registry.

use std::sync::{Arc, LazyLock};

use arc_swap::ArcSwap;

use crate::error::TelemetryResult;
use crate::state::TracingState;

static GLOBAL: LazyLock<ArcSwap<TracingState>> =
    LazyLock::new(|| ArcSwap::from_pointee(TracingState::new()));

/// The currently installed process-wide state.
pub fn global() -> Arc<TracingState> {
    GLOBAL.load_full()
}

/// Install `state` as the process-wide default, returning the previous one.
pub fn install_global(state: Arc<TracingState>) -> Arc<TracingState> {
    tracing::debug!(service = %state.service_name(), "installing global tracing state");
    GLOBAL.swap(state)
}

/// Flush the installed state and reset the process-wide default.
pub fn shutdown_global() -> TelemetryResult<()> {
    let previous = GLOBAL.swap(Arc::new(TracingState::new()));
    previous.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_and_shutdown_swap_the_default() {
        let installed = Arc::new(TracingState::new());
        install_global(Arc::clone(&installed));
        assert!(Arc::ptr_eq(&global(), &installed));

        shutdown_global().unwrap();
        assert!(!Arc::ptr_eq(&global(), &installed));
    }
}
