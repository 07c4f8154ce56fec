use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};
use db::SequenceStore;
use tracing::{error, info};

use super::AppState;

/// `GET /health` — 200 when the database answers, 500 otherwise.
pub async fn health(State(store): State<Arc<dyn SequenceStore>>) -> impl IntoResponse {
    info!("Healthcheck request received");
    match store.ping().await {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(err) => {
            error!(error = %err, "database ping failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Database connection failed")
        }
    }
}

/// `GET /metrics` — Prometheus text exposition.
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
