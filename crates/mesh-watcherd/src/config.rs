//! Daemon configuration.
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults of every section;
//! 2. the TOML file, skipped when it does not exist;
//! 3. `MESHWATCH__SECTION__FIELD` environment variables.
use std::{net::SocketAddr, path::Path};

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use mesh_core::{ProcessorConfig, ReconcileConfig, SupervisorPolicy};
use mesh_exec::ScriptConfig;
use mesh_observe::LoggerConfig;
use mesh_postgres::DatabaseConfig;

pub const ENV_PREFIX: &str = "MESHWATCH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid [{section}] section: {reason}")]
    Invalid {
        section: &'static str,
        reason: String,
    },
}

/// `[metrics]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Address of the `/metrics` and `/healthz` endpoint; unset disables it.
    pub listen: Option<SocketAddr>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    pub logger: LoggerConfig,
    pub database: DatabaseConfig,
    pub scripts: ScriptConfig,
    pub reconcile: ReconcileConfig,
    pub processor: ProcessorConfig,
    pub supervisor: SupervisorPolicy,
    pub metrics: MetricsConfig,
}

impl WatcherConfig {
    /// Load from `path` (if present) and the environment, then validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if path.exists() {
            debug!(path = %path.display(), "reading configuration file");
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .separator("__"),
        );

        let cfg: WatcherConfig = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database
            .validate()
            .map_err(|e| invalid("database", e))?;
        self.scripts.validate().map_err(|e| invalid("scripts", e))?;
        self.reconcile
            .validate()
            .map_err(|e| invalid("reconcile", e))?;
        self.processor
            .validate()
            .map_err(|e| invalid("processor", e))?;
        if self.supervisor.timeout_ms == Some(0) {
            return Err(invalid("supervisor", "timeoutMs must be positive when set"));
        }
        Ok(())
    }
}

fn invalid(section: &'static str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        section,
        reason: reason.to_string(),
    }
}
