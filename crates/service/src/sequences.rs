//! The `SequenceService` — pass-through over the sequence store.

use std::sync::Arc;

use db::models::{NewSequence, NewStep, SequenceTrackingUpdate, StepContentUpdate, StepKey};
use db::SequenceStore;
use tracing::warn;

use crate::ServiceError;

/// Entry point used by the HTTP handlers. Cheap to clone.
#[derive(Clone)]
pub struct SequenceService {
    store: Arc<dyn SequenceStore>,
}

impl SequenceService {
    pub fn new(store: Arc<dyn SequenceStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn SequenceStore> {
        &self.store
    }

    /// Create a sequence together with its steps and return its id.
    pub async fn add_sequence(
        &self,
        sequence: &NewSequence,
        steps: &[NewStep],
    ) -> Result<i64, ServiceError> {
        self.store
            .create_sequence_with_steps(sequence, steps)
            .await
            .map_err(|err| failed("failed to add sequence", err))
    }

    pub async fn update_sequence(
        &self,
        update: &SequenceTrackingUpdate,
    ) -> Result<i64, ServiceError> {
        self.store
            .update_sequence_tracking(update)
            .await
            .map_err(|err| failed("failed to update sequence", err))
    }

    pub async fn update_step(
        &self,
        update: &StepContentUpdate,
    ) -> Result<(i64, i64), ServiceError> {
        self.store
            .update_step(update)
            .await
            .map_err(|err| failed("failed to update step", err))
    }

    pub async fn delete_step(&self, key: &StepKey) -> Result<(i64, i64), ServiceError> {
        self.store
            .delete_step(key)
            .await
            .map_err(|err| failed("failed to delete step", err))
    }
}

fn failed(operation: &'static str, err: db::DbError) -> ServiceError {
    let err = ServiceError::new(operation, err);
    warn!(kind = ?err.kind(), error = %err, "sequence store call failed");
    err
}
