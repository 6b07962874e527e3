//! Postgres adapter of the store and transport seams of `mesh-core`.
//!
//! Reads go through one `sqlx` transaction per handled event ([`PgTx`]);
//! notifications arrive over `LISTEN`/`NOTIFY` ([`PgNotificationListener`]).
mod config;
pub use config::{DatabaseConfig, connect_pool};
pub use sqlx::PgPool;

mod error;
pub use error::PostgresError;

mod tx;
pub use tx::{PgTransactioner, PgTx};

mod cursor;

mod runtime;
pub use runtime::PgRuntimeRepository;

mod application;
pub use application::PgApplicationRepository;

mod label;
pub use label::{LabelOwner, PgLabelRepository};

mod listener;
pub use listener::{PgListenerConnector, PgNotificationListener};

use std::sync::Arc;

use mesh_core::Queries;

/// Query services backed by Postgres.
pub fn pg_queries() -> Queries<PgTx> {
    let runtimes = Arc::new(PgRuntimeRepository);
    Queries {
        runtimes: runtimes.clone(),
        runtime_getter: runtimes,
        applications: Arc::new(PgApplicationRepository),
        app_labels: Arc::new(PgLabelRepository::new(LabelOwner::Application)),
        runtime_labels: Arc::new(PgLabelRepository::new(LabelOwner::Runtime)),
    }
}
