use serde::{Deserialize, Serialize};

/// Retry delays of the supervised processor task and of listener reconnects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackoffStrategy {
    pub jitter: super::JitterStrategy,
    /// Delay before restarting after a clean exit; `None` restarts at once.
    pub delay_ms: Option<u64>,
    pub first_ms: u64,
    pub max_ms: u64,
    pub factor: f64,
}

impl Default for BackoffStrategy {
    fn default() -> Self {
        Self {
            jitter: super::JitterStrategy::Full,
            delay_ms: None,
            first_ms: 1_000,
            max_ms: 60_000,
            factor: 2.0,
        }
    }
}
