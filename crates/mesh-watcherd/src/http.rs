//! `/metrics` and `/healthz` endpoint.
use std::net::SocketAddr;

use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tokio::{net::TcpListener, sync::watch};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use mesh_core::ProcessorState;
use mesh_prometheus::PrometheusMetrics;

const TEXT_FORMAT: &str = "text/plain; version=0.0.4";

#[derive(Clone)]
struct AppState {
    metrics: PrometheusMetrics,
    processor: watch::Receiver<ProcessorState>,
}

pub fn router(metrics: PrometheusMetrics, processor: watch::Receiver<ProcessorState>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_text))
        .route("/healthz", get(healthz))
        .with_state(AppState { metrics, processor })
}

/// Serve `app` on `addr` until `cancel` fires.
pub async fn serve(addr: SocketAddr, app: Router, cancel: CancellationToken) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "metrics endpoint listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
}

async fn metrics_text(State(state): State<AppState>) -> Response {
    match state.metrics.encode_text() {
        Ok(body) => ([(header::CONTENT_TYPE, TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            warn!(error = %e, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// 200 while the processor is listening, 503 otherwise; the body names the state.
async fn healthz(State(state): State<AppState>) -> (StatusCode, &'static str) {
    let current = *state.processor.borrow();
    let code = match current {
        ProcessorState::Listening => StatusCode::OK,
        _ => StatusCode::SERVICE_UNAVAILABLE,
    };
    (code, current.as_str())
}
