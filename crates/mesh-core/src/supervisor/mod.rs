//! Runs the notification processor under a taskvisor [`Supervisor`].
//!
//! The supervisor owns OS signal handling: on shutdown it cancels the task token,
//! the processor finishes the notification in flight and closes its listener.
mod policy;
pub use policy::SupervisorPolicy;

use std::sync::Arc;

use taskvisor::{Subscribe, Supervisor, SupervisorConfig, TaskError, TaskFn, TaskRef};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::{error::CoreError, map::to_task_spec, processor::NotificationProcessor};

/// Task name of the processor inside the supervisor.
pub const PROCESSOR_TASK: &str = "notification-processor";

/// Wrap the processor into a restartable task.
pub fn processor_task(processor: Arc<NotificationProcessor>) -> TaskRef {
    TaskFn::arc(PROCESSOR_TASK, move |cancel: CancellationToken| {
        let processor = Arc::clone(&processor);
        async move { processor.run(cancel).await.map_err(to_task_error) }
    })
}

/// Build a supervisor, run the task and return once it has shut down.
#[instrument(level = "info", skip_all)]
pub async fn run_supervised(
    cfg: SupervisorConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
    task: TaskRef,
    policy: &SupervisorPolicy,
) -> Result<(), CoreError> {
    let sup = Supervisor::builder(cfg).with_subscribers(subscribers).build();

    info!(restart = ?policy.restart, "starting supervisor");
    sup.run(vec![to_task_spec(task, policy)])
        .await
        .map_err(|e| CoreError::Supervisor(e.to_string()))
}

/// Every processor error is retryable; the restart policy decides what happens next.
fn to_task_error(e: CoreError) -> TaskError {
    TaskError::Fail {
        reason: e.to_string(),
    }
}
