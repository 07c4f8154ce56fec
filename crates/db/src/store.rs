//! The `SequenceStore` trait and its Postgres implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, instrument};

use crate::{
    models::{
        NewSequence, NewStep, SequenceRow, SequenceTrackingUpdate, StepContentUpdate, StepKey,
        StepRow,
    },
    repository::sequences,
    transaction::ScopedTx,
    DbError,
};

/// Durable storage for sequences and their steps.
///
/// Every write is atomic: it either fully applies or leaves no trace.
/// Updates and deletes that match no row fail with [`DbError::NotFound`].
#[async_trait]
pub trait SequenceStore: Send + Sync {
    /// Insert a sequence and all of its steps in one transaction and return
    /// the new `sequence_id`.
    async fn create_sequence_with_steps(
        &self,
        sequence: &NewSequence,
        steps: &[NewStep],
    ) -> Result<i64, DbError>;

    /// Set the tracking flags of the sequence identified by
    /// `(account_id, sequence_id)` and return its id.
    async fn update_sequence_tracking(
        &self,
        update: &SequenceTrackingUpdate,
    ) -> Result<i64, DbError>;

    /// Replace the subject and body of the step identified by the full key
    /// and return `(sequence_id, step_id)`.
    async fn update_step(&self, update: &StepContentUpdate) -> Result<(i64, i64), DbError>;

    /// Delete the step identified by the full key and return
    /// `(sequence_id, step_id)` of the deleted row.
    async fn delete_step(&self, key: &StepKey) -> Result<(i64, i64), DbError>;

    async fn get_sequence(&self, account_id: i64, sequence_id: i64)
        -> Result<SequenceRow, DbError>;

    /// Steps of a sequence in creation order. Empty when nothing matches.
    async fn list_steps(&self, account_id: i64, sequence_id: i64) -> Result<Vec<StepRow>, DbError>;

    /// Round trip to the database.
    async fn ping(&self) -> Result<(), DbError>;
}

/// [`SequenceStore`] backed by a Postgres pool.
#[derive(Clone)]
pub struct PgSequenceStore {
    pool: PgPool,
}

impl PgSequenceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn now() -> i64 {
    Utc::now().timestamp()
}

#[async_trait]
impl SequenceStore for PgSequenceStore {
    #[instrument(skip_all, fields(account_id = sequence.account_id, steps = steps.len()))]
    async fn create_sequence_with_steps(
        &self,
        sequence: &NewSequence,
        steps: &[NewStep],
    ) -> Result<i64, DbError> {
        let mut tx = ScopedTx::begin(&self.pool, "create_sequence_with_steps").await?;
        let result = sequences::insert_sequence_with_steps(tx.conn(), sequence, steps, now()).await;
        let sequence_id = tx.finish(result).await?;
        debug!(sequence_id, "sequence created");
        Ok(sequence_id)
    }

    #[instrument(skip_all, fields(account_id = update.account_id, sequence_id = update.sequence_id))]
    async fn update_sequence_tracking(
        &self,
        update: &SequenceTrackingUpdate,
    ) -> Result<i64, DbError> {
        let mut tx = ScopedTx::begin(&self.pool, "update_sequence_tracking").await?;
        let result = sequences::update_sequence_tracking(tx.conn(), update, now()).await;
        tx.finish(result).await
    }

    #[instrument(skip_all, fields(
        account_id = update.key.account_id,
        sequence_id = update.key.sequence_id,
        step_id = update.key.step_id,
    ))]
    async fn update_step(&self, update: &StepContentUpdate) -> Result<(i64, i64), DbError> {
        let mut tx = ScopedTx::begin(&self.pool, "update_step").await?;
        let result = sequences::update_step_content(tx.conn(), update, now()).await;
        tx.finish(result).await
    }

    #[instrument(skip_all, fields(
        account_id = key.account_id,
        sequence_id = key.sequence_id,
        step_id = key.step_id,
    ))]
    async fn delete_step(&self, key: &StepKey) -> Result<(i64, i64), DbError> {
        let mut tx = ScopedTx::begin(&self.pool, "delete_step").await?;
        let result = sequences::delete_step(tx.conn(), key).await;
        tx.finish(result).await
    }

    async fn get_sequence(
        &self,
        account_id: i64,
        sequence_id: i64,
    ) -> Result<SequenceRow, DbError> {
        sequences::get_sequence(&self.pool, account_id, sequence_id).await
    }

    async fn list_steps(&self, account_id: i64, sequence_id: i64) -> Result<Vec<StepRow>, DbError> {
        sequences::list_steps(&self.pool, account_id, sequence_id).await
    }

    async fn ping(&self) -> Result<(), DbError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}
