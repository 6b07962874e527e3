use serde::{Deserialize, Serialize};

use mesh_model::{BackoffStrategy, DependencyTemplate, JitterStrategy};

use crate::error::CoreError;

/// The single runtime and target application the reconcilers act on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetSelector {
    pub runtime_name: String,
    pub application_name: String,
}

impl Default for TargetSelector {
    fn default() -> Self {
        Self {
            runtime_name: "runtime-poc".to_string(),
            application_name: "commerce-mock".to_string(),
        }
    }
}

impl TargetSelector {
    pub fn is_target_runtime(&self, name: &str) -> bool {
        self.runtime_name == name
    }

    pub fn is_target_application(&self, name: &str) -> bool {
        self.application_name == name
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    pub targets: TargetSelector,
    /// Page size of runtime and application list queries.
    pub page_size: u32,
    pub dependency: DependencyTemplate,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            targets: TargetSelector::default(),
            page_size: 100,
            dependency: DependencyTemplate::default(),
        }
    }
}

impl ReconcileConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.targets.runtime_name.trim().is_empty() {
            return Err(invalid("target runtime name is empty"));
        }
        if self.targets.application_name.trim().is_empty() {
            return Err(invalid("target application name is empty"));
        }
        if self.page_size == 0 {
            return Err(invalid("page size must be positive"));
        }
        if self.dependency.namespace.trim().is_empty() {
            return Err(invalid("dependency namespace is empty"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Channel the lifecycle and label handlers are registered on.
    pub channel: String,
    /// Liveness check period of the listener connection.
    pub ping_interval_ms: u64,
    /// Delays between listener reconnect attempts; `delay_ms` is unused here.
    pub reconnect: BackoffStrategy,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            channel: "events".to_string(),
            ping_interval_ms: 90_000,
            reconnect: BackoffStrategy {
                jitter: JitterStrategy::Equal,
                delay_ms: None,
                first_ms: 500,
                max_ms: 30_000,
                factor: 2.0,
            },
        }
    }
}

impl ProcessorConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.channel.trim().is_empty() {
            return Err(invalid("notification channel is empty"));
        }
        if self.ping_interval_ms == 0 {
            return Err(invalid("ping interval must be positive"));
        }
        if self.reconnect.max_ms < self.reconnect.first_ms {
            return Err(invalid("reconnect max delay is below the first delay"));
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> CoreError {
    CoreError::InvalidConfiguration(msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        ReconcileConfig::default().validate().unwrap();
        ProcessorConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_zero_page_size() {
        let cfg = ReconcileConfig {
            page_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(CoreError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn rejects_empty_channel() {
        let cfg = ProcessorConfig {
            channel: " ".into(),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
