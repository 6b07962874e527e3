use crate::metrics::backend::{MetricsBackend, NotificationOutcome, ScriptOutcome};

/// No-op metrics backend that compiles to nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl MetricsBackend for NoOpMetrics {
    #[inline(always)]
    fn record_notification(&self, _: &str, _: &str, _: NotificationOutcome) {}

    #[inline(always)]
    fn record_script(&self, _: &str, _: ScriptOutcome, _: u64) {}

    #[inline(always)]
    fn record_reconnect(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_metrics_is_zero_size() {
        assert_eq!(std::mem::size_of::<NoOpMetrics>(), 0);
    }

    #[test]
    fn outcome_labels_are_stable() {
        assert_eq!(NotificationOutcome::Unrouted.as_label(), "unrouted");
        assert_eq!(ScriptOutcome::Timeout.as_label(), "timeout");
    }
}
