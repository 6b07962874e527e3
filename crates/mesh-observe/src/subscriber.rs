//! Logs taskvisor supervision events of the processor task.
use async_trait::async_trait;
use taskvisor::{Event, EventKind, Subscribe};
use tracing::{debug, error, info, trace, warn};

/// Event queue size; the processor task produces a handful of events per restart.
const QUEUE_CAPACITY: usize = 256;

/// Taskvisor subscriber writing every event through `tracing`.
#[derive(Default)]
pub struct Subscriber;

#[async_trait]
impl Subscribe for Subscriber {
    async fn on_event(&self, event: &Event) {
        log_event(event);
    }

    fn name(&self) -> &'static str {
        "mesh-subscriber"
    }

    fn queue_capacity(&self) -> usize {
        QUEUE_CAPACITY
    }
}

fn log_event(e: &Event) {
    let task = e.task.as_deref().unwrap_or("unknown");
    let reason = e.reason.as_deref().unwrap_or("unknown");
    let attempt = e.attempt.unwrap_or(0);

    match e.kind {
        EventKind::TaskStarting => info!(task, attempt, "task starting"),
        EventKind::TaskStopped => info!(task, "task stopped"),
        EventKind::TaskFailed => error!(task, attempt, reason, "task failed, will be retried per restart policy"),
        EventKind::TimeoutHit => warn!(task, timeout_ms = e.timeout_ms.unwrap_or(0), "task timed out"),
        EventKind::BackoffScheduled => debug!(
            task,
            attempt,
            delay_ms = e.delay_ms.unwrap_or(0),
            "restart scheduled"
        ),
        EventKind::ActorExhausted => warn!(task, reason, "restart policy exhausted, task will not run again"),
        EventKind::ActorDead => error!(task, reason, "task stopped permanently"),
        EventKind::ShutdownRequested => info!("shutdown requested"),
        EventKind::AllStoppedWithinGrace => info!("all tasks stopped within grace period"),
        EventKind::GraceExceeded => warn!("grace period exceeded, tasks still running"),
        EventKind::SubscriberPanicked | EventKind::SubscriberOverflow => {
            error!(task, reason, kind = ?e.kind, "event subscriber failure")
        }
        _ => trace!(task, kind = ?e.kind, "supervisor event"),
    }
}
