//! External mesh operations.
//!
//! Every operation runs a script against the mesh control plane. Operations are
//! idempotent on the mesh side; callers still check existence where the outcome
//! depends on it.
mod error;
pub use error::ScriptError;

use async_trait::async_trait;

use mesh_model::Dependency;

/// Directory holding the per-application service entry resources.
pub const SERVICE_ENTRIES_DIR: &str = "service-entries";

/// Resource path of an application's service entry.
pub fn service_entry_path(app_name: &str) -> String {
    format!("{SERVICE_ENTRIES_DIR}/{app_name}.yaml")
}

#[async_trait]
pub trait ScriptRunner: Send + Sync {
    /// Run `script` with positional `args` and return its combined output.
    ///
    /// A non-zero exit fails with [`ScriptError::Failed`] carrying that output.
    async fn run(&self, script: &str, args: &[String]) -> Result<String, ScriptError>;

    /// Create or replace the dependency object in the mesh.
    async fn apply_dependency(&self, dependency: &Dependency) -> Result<(), ScriptError>;

    /// Remove the dependency; a missing dependency is not an error.
    async fn delete_dependency(&self, name: &str) -> Result<(), ScriptError>;

    async fn dependency_exists(&self, name: &str) -> Result<bool, ScriptError>;

    /// Names of the applications that currently have a service entry.
    async fn list_services(&self) -> Result<Vec<String>, ScriptError>;

    async fn apply_resource(&self, path: &str) -> Result<(), ScriptError>;

    async fn delete_resource(&self, path: &str) -> Result<(), ScriptError>;

    async fn register_runtime(&self) -> Result<(), ScriptError>;

    async fn register_application(&self) -> Result<(), ScriptError>;

    async fn delete_runtime(&self) -> Result<(), ScriptError>;

    async fn delete_application(&self) -> Result<(), ScriptError>;
}
