//! Prometheus metrics backend of the reconciler.
//!
//! [`PrometheusMetrics`] implements [`mesh_core::MetricsBackend`]. Serving the
//! `/metrics` endpoint is left to the daemon, which calls
//! [`PrometheusMetrics::encode_text`].
//!
//! ## Metrics
//! - `meshwatch_notifications_total{kind, operation, outcome}` - Counter
//! - `meshwatch_scripts_total{script, outcome}` - Counter
//! - `meshwatch_script_duration_seconds{script}` - Histogram
//! - `meshwatch_listener_reconnects_total` - Counter
mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
