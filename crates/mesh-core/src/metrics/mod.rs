//! Metrics collection abstraction for the reconciler.
//!
//! Backends (prometheus, ...) implement [`MetricsBackend`] and are handed to the
//! processor and the script runner as a [`MetricsHandle`].
mod backend;
pub use backend::{MetricsBackend, MetricsHandle, NotificationOutcome, ScriptOutcome};

mod noop;
pub use noop::NoOpMetrics;

use std::sync::Arc;

/// Create a no-op metrics handle.
#[inline]
pub fn noop_metrics() -> MetricsHandle {
    Arc::new(NoOpMetrics)
}
