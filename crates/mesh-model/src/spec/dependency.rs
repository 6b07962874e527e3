use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{domain::DEPENDENCY_NAME_PREFIX, spec::DependencyTemplate};

/// Kind written into every dependency object.
pub const DEPENDENCY_KIND: &str = "Dependency";

/// Mesh configuration object describing the traffic a source workload may send
/// to a set of destination workloads.
///
/// Never persisted locally; the mesh control plane is the source of truth.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    pub metadata: ObjectMeta,
    pub spec: DependencySpec,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMeta {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencySpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub identity_label: String,
    /// Destination application names; sorted and without duplicates.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub destinations: BTreeSet<String>,
}

impl Dependency {
    /// Name of the dependency owned by a runtime: `dep-rt-<runtime id>`.
    pub fn dependency_name(runtime_id: &str) -> String {
        format!("{DEPENDENCY_NAME_PREFIX}{runtime_id}")
    }

    /// Build the dependency of `runtime_id` pointing at `destinations`.
    pub fn for_runtime<I, S>(runtime_id: &str, template: &DependencyTemplate, destinations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            type_meta: TypeMeta {
                kind: DEPENDENCY_KIND.to_string(),
                api_version: template.api_version.clone(),
            },
            metadata: ObjectMeta {
                name: Self::dependency_name(runtime_id),
                namespace: template.namespace.clone(),
            },
            spec: DependencySpec {
                source: template.source.clone(),
                identity_label: template.identity_label.clone(),
                destinations: destinations.into_iter().map(Into::into).collect(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}
