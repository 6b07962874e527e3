use std::time::Duration;

use mesh_model::RestartStrategy;
use taskvisor::RestartPolicy;

/// `interval` is the pause before an `always` restart that follows a clean exit.
pub fn to_restart_policy(s: RestartStrategy, interval: Option<Duration>) -> RestartPolicy {
    match s {
        RestartStrategy::OnFailure => RestartPolicy::OnFailure,
        RestartStrategy::Always => RestartPolicy::Always { interval },
        RestartStrategy::Never => RestartPolicy::Never,
    }
}
