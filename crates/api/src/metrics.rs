//! Per-route request metrics.
//!
//! The router is handed a [`MetricsRecorder`] at construction time; nothing
//! is registered in the prometheus default registry. [`RequestMetrics`]
//! keeps a request counter and a latency histogram per path.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use tracing::error;

/// Sink for request observations.
pub trait MetricsRecorder: Send + Sync {
    fn record(&self, path: &str, elapsed: Duration);

    /// Text exposition served by `GET /metrics`.
    fn render(&self) -> String;
}

/// [`MetricsRecorder`] backed by its own prometheus [`Registry`].
#[derive(Clone)]
pub struct RequestMetrics {
    registry: Registry,
    requests: IntCounterVec,
    durations: HistogramVec,
}

impl RequestMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let requests = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["path"],
        )?;
        let durations = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "Duration of HTTP requests in seconds",
            )
            .buckets(prometheus::DEFAULT_BUCKETS.to_vec()),
            &["path"],
        )?;

        let registry = Registry::new();
        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(durations.clone()))?;

        Ok(Self {
            registry,
            requests,
            durations,
        })
    }

    /// Number of requests recorded for `path`. Reading does not create a
    /// series for an unseen path.
    pub fn request_count(&self, path: &str) -> u64 {
        self.registry
            .gather()
            .iter()
            .filter(|family| family.get_name() == "http_requests_total")
            .flat_map(|family| family.get_metric())
            .find(|metric| {
                metric
                    .get_label()
                    .iter()
                    .any(|label| label.get_name() == "path" && label.get_value() == path)
            })
            .map_or(0, |metric| metric.get_counter().get_value() as u64)
    }
}

impl MetricsRecorder for RequestMetrics {
    fn record(&self, path: &str, elapsed: Duration) {
        self.requests.with_label_values(&[path]).inc();
        self.durations
            .with_label_values(&[path])
            .observe(elapsed.as_secs_f64());
    }

    fn render(&self) -> String {
        let mut buf = Vec::new();
        if let Err(err) = TextEncoder::new().encode(&self.registry.gather(), &mut buf) {
            error!(error = %err, "failed to encode metrics");
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

/// Route-layer middleware recording one observation per request, labelled
/// with the matched route path.
pub async fn track_request(
    State(metrics): State<Arc<dyn MetricsRecorder>>,
    req: Request,
    next: Next,
) -> Response {
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    let start = Instant::now();
    let response = next.run(req).await;
    metrics.record(&path, start.elapsed());
    response
}
