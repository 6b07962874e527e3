use serde::{Deserialize, Serialize};

/// Fixed parts of every dependency object the reconciler asserts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencyTemplate {
    pub api_version: String,
    pub namespace: String,
    /// Source workload of the dependency.
    pub source: String,
    /// Workload label used to select source and destinations.
    pub identity_label: String,
}

impl Default for DependencyTemplate {
    fn default() -> Self {
        Self {
            api_version: "admiral.io/v1alpha1".to_string(),
            namespace: "admiral".to_string(),
            source: "webapp".to_string(),
            identity_label: "identity".to_string(),
        }
    }
}
