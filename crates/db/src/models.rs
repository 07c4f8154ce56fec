//! Row structs that map 1-to-1 onto database tables, plus the write inputs
//! the store accepts.
//!
//! Timestamps are Unix epoch seconds assigned by the store.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// sequences
// ---------------------------------------------------------------------------

/// A persisted sequence row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SequenceRow {
    pub sequence_id: i64,
    pub account_id: i64,
    pub created_at: i64,
    pub updated_at: i64,
    pub sequence_name: String,
    pub sequence_open_tracking_enabled: bool,
    pub sequence_click_tracking_enabled: bool,
}

/// Input for a new sequence. The store assigns the id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSequence {
    pub account_id: i64,
    pub sequence_name: String,
    pub sequence_open_tracking_enabled: bool,
    pub sequence_click_tracking_enabled: bool,
}

/// New values for a sequence's tracking flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceTrackingUpdate {
    pub account_id: i64,
    pub sequence_id: i64,
    pub sequence_open_tracking_enabled: bool,
    pub sequence_click_tracking_enabled: bool,
}

// ---------------------------------------------------------------------------
// steps
// ---------------------------------------------------------------------------

/// A persisted step row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct StepRow {
    pub step_id: i64,
    pub account_id: i64,
    pub sequence_id: i64,
    /// Zero-based index of the step in the batch it was created with.
    pub step_position: i32,
    pub created_at: i64,
    pub updated_at: i64,
    pub step_email_subject: String,
    pub step_email_body: String,
    pub wait_days: i32,
    pub eligible_start_time: i64,
    pub eligible_end_time: i64,
}

/// Input for a step created together with its parent sequence.
///
/// `account_id` and `sequence_id` are copied from the parent at insert time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStep {
    pub step_email_subject: String,
    pub step_email_body: String,
    pub wait_days: i32,
    pub eligible_start_time: i64,
    pub eligible_end_time: i64,
}

/// The full key of a step. Every step mutation filters on all three ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepKey {
    pub account_id: i64,
    pub sequence_id: i64,
    pub step_id: i64,
}

/// New email content for an existing step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepContentUpdate {
    pub key: StepKey,
    pub step_email_subject: String,
    pub step_email_body: String,
}
