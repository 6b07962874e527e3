use std::sync::Arc;

/// How the processor finished with one notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// Handler returned success.
    Handled,
    /// Handler returned an error; the event is dropped.
    Failed,
    /// No handler registered for the key.
    Unrouted,
    /// Envelope could not be decoded.
    Undecodable,
}

impl NotificationOutcome {
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            NotificationOutcome::Handled => "handled",
            NotificationOutcome::Failed => "failed",
            NotificationOutcome::Unrouted => "unrouted",
            NotificationOutcome::Undecodable => "undecodable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptOutcome {
    Success,
    Failure,
    Timeout,
}

impl ScriptOutcome {
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            ScriptOutcome::Success => "success",
            ScriptOutcome::Failure => "failure",
            ScriptOutcome::Timeout => "timeout",
        }
    }
}

/// Backend metrics collection interface.
pub trait MetricsBackend: Send + Sync + 'static {
    /// Record one processed notification.
    ///
    /// # Arguments
    /// - `kind`: resource kind of the envelope, `unknown` if undecodable
    /// - `operation`: operation of the envelope, `unknown` if undecodable
    /// - `outcome`: how processing ended
    fn record_notification(&self, kind: &str, operation: &str, outcome: NotificationOutcome);

    /// Record one script execution with its wall-clock duration.
    fn record_script(&self, script: &str, outcome: ScriptOutcome, duration_ms: u64);

    /// Record a lost listener connection.
    fn record_reconnect(&self);
}

/// Shared handle to metrics backend.
pub type MetricsHandle = Arc<dyn MetricsBackend>;
