//! Conversions from model strategies into taskvisor policies.
mod backoff;
mod restart;
mod spec;

pub use backoff::to_backoff_policy;
pub use restart::to_restart_policy;
pub use spec::to_task_spec;
