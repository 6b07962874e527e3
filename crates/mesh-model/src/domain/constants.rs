//! Well-known label keys and values shared by the dispatcher and the handlers.

/// Key of the label carrying the scenario assignment of a runtime or an application.
pub const SCENARIOS_KEY: &str = "scenarios";

/// Scenario every object belongs to by default.
///
/// Membership in this scenario alone never triggers reconciliation.
pub const DEFAULT_SCENARIO: &str = "DEFAULT";

/// Prefix of the mesh `Dependency` object name; the runtime id is appended.
pub const DEPENDENCY_NAME_PREFIX: &str = "dep-rt-";
