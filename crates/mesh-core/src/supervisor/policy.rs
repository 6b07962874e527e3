use serde::{Deserialize, Serialize};

use mesh_model::{BackoffStrategy, RestartStrategy};

/// Restart policy of the supervised notification processor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SupervisorPolicy {
    pub restart: RestartStrategy,
    pub backoff: BackoffStrategy,
    /// Upper bound of a single run; unset keeps the processor running until shutdown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}
