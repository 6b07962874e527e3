use mesh_core::ScriptError;
use mesh_model::Dependency;

/// Renders dependency objects into the document the applier script consumes.
///
/// The output is block-formatted JSON, which every YAML parser accepts.
#[derive(Debug, Clone, Copy, Default)]
pub struct DependencyResolver;

impl DependencyResolver {
    pub fn resolve(&self, dependency: &Dependency) -> Result<String, ScriptError> {
        serde_json::to_string_pretty(dependency).map_err(|e| ScriptError::Resolve {
            what: format!("dependency {}", dependency.name()),
            reason: e.to_string(),
        })
    }
}
