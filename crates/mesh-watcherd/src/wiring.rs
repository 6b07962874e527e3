use std::sync::Arc;

use tracing::info;

use mesh_core::{
    AppLabelHandler, AppLifecycleHandler, CoreError, HandlerRegistry, LabelDispatcher,
    ReconcileConfig, RuntimeLabelHandler, RuntimeLifecycleHandler, ScriptRunner,
};
use mesh_model::{HandlerKey, ResourceKind};
use mesh_postgres::{PgPool, PgTransactioner, pg_queries};

/// Register the label dispatcher and both lifecycle handlers on `channel`.
pub fn build_registry(
    channel: &str,
    pool: PgPool,
    scripts: Arc<dyn ScriptRunner>,
    cfg: &ReconcileConfig,
) -> Result<HandlerRegistry, CoreError> {
    let transact = Arc::new(PgTransactioner::new(pool));
    let queries = pg_queries();

    let labels = LabelDispatcher::new()
        .with_handler(
            ResourceKind::Application,
            Arc::new(AppLabelHandler::new(
                Arc::clone(&transact),
                queries.clone(),
                Arc::clone(&scripts),
                cfg.clone(),
            )),
        )
        .with_handler(
            ResourceKind::Runtime,
            Arc::new(RuntimeLabelHandler::new(
                transact,
                queries,
                Arc::clone(&scripts),
                cfg.clone(),
            )),
        );

    let registry = HandlerRegistry::builder()
        .with(HandlerKey::new(channel, ResourceKind::Label), Arc::new(labels))?
        .with(
            HandlerKey::new(channel, ResourceKind::Application),
            Arc::new(AppLifecycleHandler::new(
                Arc::clone(&scripts),
                cfg.targets.clone(),
            )),
        )?
        .with(
            HandlerKey::new(channel, ResourceKind::Runtime),
            Arc::new(RuntimeLifecycleHandler::new(scripts, cfg.targets.clone())),
        )?
        .build();

    info!(channel, handlers = registry.len(), "handler registry built");
    Ok(registry)
}
