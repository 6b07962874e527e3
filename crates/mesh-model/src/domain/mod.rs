mod constants;
pub use constants::{DEFAULT_SCENARIO, DEPENDENCY_NAME_PREFIX, SCENARIOS_KEY};

mod label;
pub use label::Label;

mod scenario;
pub use scenario::ScenarioSet;

mod filter;
pub use filter::LabelFilter;

mod page;
pub use page::Page;

mod resource;
pub use resource::{Application, ApplicationStatus, Runtime, StatusCondition};
pub use resource::{ApplicationRef, RuntimeRef, parse_object_id};
