use std::time::Duration;

use serde::{Deserialize, Serialize};
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::info;

use crate::PostgresError;

/// `[database]` section of the daemon configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_ms: u64,
    pub idle_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://director@localhost:5432/director?sslmode=disable".to_string(),
            max_connections: 10,
            connect_timeout_ms: 5_000,
            idle_timeout_ms: 600_000,
        }
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<(), PostgresError> {
        if self.url.trim().is_empty() {
            return Err(PostgresError::InvalidConfig("database url is empty".into()));
        }
        if self.max_connections == 0 {
            return Err(PostgresError::InvalidConfig(
                "max_connections must be positive".into(),
            ));
        }
        if self.connect_timeout_ms == 0 {
            return Err(PostgresError::InvalidConfig(
                "connect_timeout_ms must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Open the pool shared by the transactioner and the listener connector.
pub async fn connect_pool(cfg: &DatabaseConfig) -> Result<PgPool, PostgresError> {
    cfg.validate()?;

    let idle = (cfg.idle_timeout_ms > 0).then(|| Duration::from_millis(cfg.idle_timeout_ms));
    let pool = PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .acquire_timeout(Duration::from_millis(cfg.connect_timeout_ms))
        .idle_timeout(idle)
        .connect(&cfg.url)
        .await?;

    info!(max_connections = cfg.max_connections, "database pool ready");
    Ok(pool)
}
