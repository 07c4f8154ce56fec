//! Route handlers and the state they share.

use std::sync::Arc;

use service::SequenceService;

use crate::metrics::MetricsRecorder;

pub mod health;
pub mod sequences;
pub mod steps;

/// State of the application router.
#[derive(Clone)]
pub struct AppState {
    pub service: SequenceService,
    pub metrics: Arc<dyn MetricsRecorder>,
}
