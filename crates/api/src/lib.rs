//! `api` crate — HTTP layer for the sequence service.
//!
//! Exposes, on the application listener:
//!   POST   /v1/sequence
//!   PUT    /v1/sequence
//!   PUT    /v1/step
//!   DELETE /v1/step
//!   GET    /metrics
//!
//! and, on the health-check listener:
//!   GET    /health

pub mod auth;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod requests;

use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use db::SequenceStore;
use tokio::{net::TcpListener, sync::watch};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::info;

pub use auth::JwtAuth;
pub use error::ApiError;
pub use handlers::AppState;
pub use metrics::{MetricsRecorder, RequestMetrics};

use handlers::{health, sequences, steps};

/// Build the application router.
///
/// `/v1` routes are observed by `state.metrics`. When `jwt` is set every
/// route, `/metrics` included, sits behind the JWT gate.
pub fn app_router(state: AppState, jwt: Option<JwtAuth>) -> Router {
    let mut router = Router::new()
        .route(
            "/v1/sequence",
            post(sequences::add_sequence).put(sequences::update_sequence),
        )
        .route(
            "/v1/step",
            put(steps::update_step).delete(steps::delete_step),
        )
        .route_layer(middleware::from_fn_with_state(
            state.metrics.clone(),
            metrics::track_request,
        ))
        .route("/metrics", get(health::metrics))
        .with_state(state);

    if let Some(jwt) = jwt {
        router = router.layer(middleware::from_fn_with_state(
            Arc::new(jwt),
            auth::require_jwt,
        ));
    }

    router
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
}

/// Build the health-check router.
pub fn health_router(store: Arc<dyn SequenceStore>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .with_state(store)
        .layer(TraceLayer::new_for_http())
}

/// Serve both routers until `shutdown` resolves, then drain in-flight
/// requests on both listeners.
pub async fn serve(
    app_addr: SocketAddr,
    app: Router,
    health_addr: SocketAddr,
    health: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let app_listener = TcpListener::bind(app_addr).await?;
    let health_listener = TcpListener::bind(health_addr).await?;

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown.await;
        info!("shutting down");
        let _ = stop_tx.send(true);
    });

    info!(%app_addr, "server started");
    info!(%health_addr, "health check server started");

    let app_server = axum::serve(app_listener, app)
        .with_graceful_shutdown(stopped(stop_rx.clone()))
        .into_future();
    let health_server = axum::serve(health_listener, health)
        .with_graceful_shutdown(stopped(stop_rx))
        .into_future();

    tokio::try_join!(app_server, health_server)?;
    info!("server exited properly");
    Ok(())
}

async fn stopped(mut stop_rx: watch::Receiver<bool>) {
    // A dropped sender also means stop.
    let _ = stop_rx.wait_for(|stop| *stop).await;
}

#[cfg(test)]
mod router_tests;
