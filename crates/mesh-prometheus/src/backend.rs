use std::sync::Arc;

use prometheus::{
    Counter, CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
    proto::MetricFamily,
};

use mesh_core::{MetricsBackend, NotificationOutcome, ScriptOutcome};

const NAMESPACE: &str = "meshwatch";

/// Label cardinality is bounded: `kind` and `operation` come from closed enums
/// (or `unknown`), `script` from the fixed set of mesh scripts.
#[derive(Clone)]
pub struct PrometheusMetrics {
    notifications: CounterVec,
    scripts: CounterVec,
    script_duration: HistogramVec,
    reconnects: Counter,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let notifications = CounterVec::new(
            Opts::new("notifications_total", "Change notifications processed").namespace(NAMESPACE),
            &["kind", "operation", "outcome"],
        )?;
        registry.register(Box::new(notifications.clone()))?;

        let scripts = CounterVec::new(
            Opts::new("scripts_total", "Mesh scripts executed").namespace(NAMESPACE),
            &["script", "outcome"],
        )?;
        registry.register(Box::new(scripts.clone()))?;

        let script_duration = HistogramVec::new(
            HistogramOpts::new("script_duration_seconds", "Mesh script wall-clock time")
                .namespace(NAMESPACE)
                .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
            &["script"],
        )?;
        registry.register(Box::new(script_duration.clone()))?;

        let reconnects = Counter::with_opts(
            Opts::new(
                "listener_reconnects_total",
                "Lost notification listener connections",
            )
            .namespace(NAMESPACE),
        )?;
        registry.register(Box::new(reconnects.clone()))?;

        Ok(Self {
            notifications,
            scripts,
            script_duration,
            reconnects,
            registry,
        })
    }

    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Text exposition format of every registered metric.
    pub fn encode_text(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buf = Vec::new();
        encoder.encode(&self.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_notification(&self, kind: &str, operation: &str, outcome: NotificationOutcome) {
        self.notifications
            .with_label_values(&[kind, operation, outcome.as_label()])
            .inc();
    }

    fn record_script(&self, script: &str, outcome: ScriptOutcome, duration_ms: u64) {
        self.scripts
            .with_label_values(&[script, outcome.as_label()])
            .inc();
        self.script_duration
            .with_label_values(&[script])
            .observe(duration_ms as f64 / 1000.0);
    }

    fn record_reconnect(&self) {
        self.reconnects.inc();
    }
}
