//! `MockSequenceStore` — an in-memory test double for `SequenceStore`.
//!
//! Useful in service and API tests where a real Postgres instance is either
//! unavailable or irrelevant. Ids are assigned sequentially from 1, like a
//! fresh `BIGSERIAL` column.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::{
    models::{
        NewSequence, NewStep, SequenceRow, SequenceTrackingUpdate, StepContentUpdate, StepKey,
        StepRow,
    },
    DbError, SequenceStore,
};

#[derive(Default)]
struct MockState {
    next_sequence_id: i64,
    next_step_id: i64,
    sequences: BTreeMap<i64, SequenceRow>,
    steps: BTreeMap<i64, StepRow>,
    clock: i64,
}

impl MockState {
    fn tick(&mut self) -> i64 {
        self.clock += 1;
        self.clock
    }
}

/// In-memory store with the same scoping and not-found rules as the real one.
pub struct MockSequenceStore {
    state: Mutex<MockState>,
    /// When set, every call fails as if the database were unreachable.
    unavailable: bool,
}

impl Default for MockSequenceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSequenceStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            unavailable: false,
        }
    }

    /// A store whose every call fails with a pool timeout.
    pub fn unavailable() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            unavailable: true,
        }
    }

    pub fn sequence_count(&self) -> usize {
        self.lock().sequences.len()
    }

    pub fn step_count(&self) -> usize {
        self.lock().steps.len()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_available(&self) -> Result<(), DbError> {
        if self.unavailable {
            return Err(DbError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl SequenceStore for MockSequenceStore {
    async fn create_sequence_with_steps(
        &self,
        sequence: &NewSequence,
        steps: &[NewStep],
    ) -> Result<i64, DbError> {
        self.check_available()?;
        let mut state = self.lock();
        let now = state.tick();

        state.next_sequence_id += 1;
        let sequence_id = state.next_sequence_id;
        state.sequences.insert(
            sequence_id,
            SequenceRow {
                sequence_id,
                account_id: sequence.account_id,
                created_at: now,
                updated_at: now,
                sequence_name: sequence.sequence_name.clone(),
                sequence_open_tracking_enabled: sequence.sequence_open_tracking_enabled,
                sequence_click_tracking_enabled: sequence.sequence_click_tracking_enabled,
            },
        );

        for (step_position, step) in (0_i32..).zip(steps) {
            state.next_step_id += 1;
            let step_id = state.next_step_id;
            state.steps.insert(
                step_id,
                StepRow {
                    step_id,
                    account_id: sequence.account_id,
                    sequence_id,
                    step_position,
                    created_at: now,
                    updated_at: now,
                    step_email_subject: step.step_email_subject.clone(),
                    step_email_body: step.step_email_body.clone(),
                    wait_days: step.wait_days,
                    eligible_start_time: step.eligible_start_time,
                    eligible_end_time: step.eligible_end_time,
                },
            );
        }

        Ok(sequence_id)
    }

    async fn update_sequence_tracking(
        &self,
        update: &SequenceTrackingUpdate,
    ) -> Result<i64, DbError> {
        self.check_available()?;
        let mut state = self.lock();
        let now = state.tick();
        let row = state
            .sequences
            .get_mut(&update.sequence_id)
            .filter(|row| row.account_id == update.account_id)
            .ok_or(DbError::NotFound)?;

        row.sequence_open_tracking_enabled = update.sequence_open_tracking_enabled;
        row.sequence_click_tracking_enabled = update.sequence_click_tracking_enabled;
        row.updated_at = now;
        Ok(row.sequence_id)
    }

    async fn update_step(&self, update: &StepContentUpdate) -> Result<(i64, i64), DbError> {
        self.check_available()?;
        let mut state = self.lock();
        let now = state.tick();
        let key = update.key;
        let row = state
            .steps
            .get_mut(&key.step_id)
            .filter(|row| row.account_id == key.account_id && row.sequence_id == key.sequence_id)
            .ok_or(DbError::NotFound)?;

        row.step_email_subject = update.step_email_subject.clone();
        row.step_email_body = update.step_email_body.clone();
        row.updated_at = now;
        Ok((row.sequence_id, row.step_id))
    }

    async fn delete_step(&self, key: &StepKey) -> Result<(i64, i64), DbError> {
        self.check_available()?;
        let mut state = self.lock();
        let matches = state
            .steps
            .get(&key.step_id)
            .is_some_and(|row| row.account_id == key.account_id && row.sequence_id == key.sequence_id);
        if !matches {
            return Err(DbError::NotFound);
        }

        state.steps.remove(&key.step_id);
        Ok((key.sequence_id, key.step_id))
    }

    async fn get_sequence(
        &self,
        account_id: i64,
        sequence_id: i64,
    ) -> Result<SequenceRow, DbError> {
        self.check_available()?;
        self.lock()
            .sequences
            .get(&sequence_id)
            .filter(|row| row.account_id == account_id)
            .cloned()
            .ok_or(DbError::NotFound)
    }

    async fn list_steps(&self, account_id: i64, sequence_id: i64) -> Result<Vec<StepRow>, DbError> {
        self.check_available()?;
        let mut rows: Vec<StepRow> = self
            .lock()
            .steps
            .values()
            .filter(|row| row.account_id == account_id && row.sequence_id == sequence_id)
            .cloned()
            .collect();
        rows.sort_by_key(|row| (row.step_position, row.step_id));
        Ok(rows)
    }

    async fn ping(&self) -> Result<(), DbError> {
        self.check_available()
    }
}
