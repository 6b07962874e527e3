use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Kind of row a change notification refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Label,
    Application,
    Runtime,
}

impl ResourceKind {
    /// Returns the kind as a static string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Label => "label",
            ResourceKind::Application => "application",
            ResourceKind::Runtime => "runtime",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "label" | "labels" => Ok(ResourceKind::Label),
            "application" | "applications" => Ok(ResourceKind::Application),
            "runtime" | "runtimes" => Ok(ResourceKind::Runtime),
            other => Err(ModelError::UnknownResourceKind(other.to_string())),
        }
    }
}
