mod domain;
pub use domain::{Application, ApplicationStatus, Runtime, StatusCondition};
pub use domain::{ApplicationRef, RuntimeRef, parse_object_id};
pub use domain::{DEFAULT_SCENARIO, DEPENDENCY_NAME_PREFIX, SCENARIOS_KEY};
pub use domain::{Label, LabelFilter, Page, ScenarioSet};

mod error;
pub use error::{ModelError, ModelResult};

mod kind;
pub use kind::{Operation, ResourceKind};

mod notification;
pub use notification::{HandlerKey, NotificationEnvelope};

mod spec;
pub use spec::{DEPENDENCY_KIND, Dependency, DependencySpec, DependencyTemplate, ObjectMeta, TypeMeta};

mod strategy;
pub use strategy::{BackoffStrategy, JitterStrategy, RestartStrategy};
