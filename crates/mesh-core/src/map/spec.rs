use std::time::Duration;

use taskvisor::{TaskRef, TaskSpec};

use super::{to_backoff_policy, to_restart_policy};
use crate::supervisor::SupervisorPolicy;

/// Task spec of a long-running task; a zero or missing timeout means unbounded.
pub fn to_task_spec(task: TaskRef, p: &SupervisorPolicy) -> TaskSpec {
    TaskSpec::new(
        task,
        to_restart_policy(p.restart, p.backoff.delay_ms.map(Duration::from_millis)),
        to_backoff_policy(&p.backoff),
        p.timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis),
    )
}
