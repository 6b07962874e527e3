mod cli;
mod config;
mod http;
mod wiring;

use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use mesh_core::{MetricsHandle, NotificationProcessor, processor_task, run_supervised};
use mesh_exec::SubprocessScriptRunner;
use mesh_observe::{Subscriber, init_logger};
use mesh_postgres::{PgListenerConnector, connect_pool};
use mesh_prometheus::PrometheusMetrics;
use taskvisor::{Subscribe, SupervisorConfig};

use crate::{cli::Args, config::WatcherConfig};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    // 1) config
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let cfg = WatcherConfig::load(&args.config)?;

    // 2) logger
    init_logger(&cfg.logger)?;
    info!(config = %args.config.display(), "logger initialized");
    if args.check {
        info!("configuration is valid");
        return Ok(());
    }

    // 3) metrics
    let metrics = PrometheusMetrics::new()?;
    let metrics_handle: MetricsHandle = Arc::new(metrics.clone());

    // 4) database + scripts
    let pool = connect_pool(&cfg.database).await?;
    let scripts = Arc::new(
        SubprocessScriptRunner::new(cfg.scripts.clone())?.with_metrics(Arc::clone(&metrics_handle)),
    );

    // 5) handlers + processor
    let registry = wiring::build_registry(
        &cfg.processor.channel,
        pool.clone(),
        scripts,
        &cfg.reconcile,
    )?;
    let processor = Arc::new(
        NotificationProcessor::new(
            Arc::new(registry),
            Arc::new(PgListenerConnector::new(pool)),
            cfg.processor.clone(),
        )
        .with_metrics(metrics_handle),
    );

    // 6) metrics endpoint
    let http_cancel = CancellationToken::new();
    let http_task = cfg.metrics.listen.map(|addr| {
        let app = http::router(metrics, processor.state());
        let cancel = http_cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = http::serve(addr, app, cancel).await {
                warn!(%addr, error = %e, "metrics endpoint stopped");
            }
        })
    });

    // 7) supervise until shutdown
    let subscribers: Vec<Arc<dyn Subscribe>> = vec![Arc::new(Subscriber)];
    let res = run_supervised(
        SupervisorConfig::default(),
        subscribers,
        processor_task(processor),
        &cfg.supervisor,
    )
    .await;

    http_cancel.cancel();
    if let Some(task) = http_task {
        task.await.ok();
    }

    res?;
    info!("watcher stopped");
    Ok(())
}
