pub mod config;
pub mod error;
pub mod handler;
pub mod listener;
pub mod map;
pub mod metrics;
pub mod processor;
pub mod reconcile;
pub mod registry;
pub mod script;
pub mod store;
pub mod supervisor;

#[cfg(test)]
mod testing;

pub use config::{ProcessorConfig, ReconcileConfig, TargetSelector};
pub use error::CoreError;
pub use handler::{LabelHandler, NotificationHandler};
pub use listener::{ListenerConnector, ListenerError, Notification, NotificationListener};
pub use metrics::{
    MetricsBackend, MetricsHandle, NoOpMetrics, NotificationOutcome, ScriptOutcome, noop_metrics,
};
pub use processor::{NotificationProcessor, ProcessorState};
pub use reconcile::{
    AppLabelHandler, AppLifecycleHandler, LabelDispatcher, RuntimeLabelHandler,
    RuntimeLifecycleHandler,
};
pub use registry::{HandlerRegistry, HandlerRegistryBuilder};
pub use script::{ScriptError, ScriptRunner};
pub use store::{
    ApplicationLister, LabelGetter, Queries, RequestScope, RuntimeGetter, RuntimeLister,
    StoreError, Transaction, Transactioner,
};
pub use supervisor::{SupervisorPolicy, processor_task, run_supervised};
