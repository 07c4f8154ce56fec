//! Request and response bodies for the `/v1` routes.
//!
//! Bodies are decoded from raw bytes with `serde_json`. Missing fields take
//! zero values so that an absent identifier is reported by validation rather
//! than by the decoder, and validation turns each request into the store's
//! input types.

use db::models::{NewSequence, NewStep, SequenceTrackingUpdate, StepContentUpdate, StepKey};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::ApiError;

/// A decoded request that can be checked and converted into store input.
pub trait ValidatedRequest: DeserializeOwned {
    type Output;

    /// Either the store input or the names of every invalid field.
    fn validate(self) -> Result<Self::Output, Vec<&'static str>>;
}

/// Decode `body` as `T` and validate it.
pub fn decode<T: ValidatedRequest>(body: &[u8]) -> Result<T::Output, ApiError> {
    let request: T = serde_json::from_slice(body)?;
    request
        .validate()
        .map_err(|fields| ApiError::Validation { fields })
}

fn check(invalid: &mut Vec<&'static str>, ok: bool, field: &'static str) {
    if !ok {
        invalid.push(field);
    }
}

// ---------------------------------------------------------------------------
// POST /v1/sequence
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StepRequest {
    pub step_email_subject: String,
    pub step_email_body: String,
    pub wait_days: i32,
    pub eligible_start_time: i64,
    pub eligible_end_time: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddSequenceRequest {
    pub account_id: i64,
    pub sequence_name: String,
    pub sequence_open_tracking_enabled: bool,
    pub sequence_click_tracking_enabled: bool,
    pub steps: Option<Vec<StepRequest>>,
}

impl ValidatedRequest for AddSequenceRequest {
    type Output = (NewSequence, Vec<NewStep>);

    fn validate(self) -> Result<Self::Output, Vec<&'static str>> {
        let mut invalid = Vec::new();
        check(&mut invalid, self.account_id > 0, "account_id");
        check(&mut invalid, !self.sequence_name.is_empty(), "sequence_name");
        if !invalid.is_empty() {
            return Err(invalid);
        }

        let sequence = NewSequence {
            account_id: self.account_id,
            sequence_name: self.sequence_name,
            sequence_open_tracking_enabled: self.sequence_open_tracking_enabled,
            sequence_click_tracking_enabled: self.sequence_click_tracking_enabled,
        };
        let steps = self
            .steps
            .unwrap_or_default()
            .into_iter()
            .map(|step| NewStep {
                step_email_subject: step.step_email_subject,
                step_email_body: step.step_email_body,
                wait_days: step.wait_days,
                eligible_start_time: step.eligible_start_time,
                eligible_end_time: step.eligible_end_time,
            })
            .collect();
        Ok((sequence, steps))
    }
}

// ---------------------------------------------------------------------------
// PUT /v1/sequence
// ---------------------------------------------------------------------------

/// Both flags must be present, even when `false`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateSequenceRequest {
    pub account_id: i64,
    pub sequence_id: i64,
    pub sequence_open_tracking_enabled: Option<bool>,
    pub sequence_click_tracking_enabled: Option<bool>,
}

impl ValidatedRequest for UpdateSequenceRequest {
    type Output = SequenceTrackingUpdate;

    fn validate(self) -> Result<Self::Output, Vec<&'static str>> {
        let mut invalid = Vec::new();
        check(&mut invalid, self.account_id > 0, "account_id");
        check(&mut invalid, self.sequence_id > 0, "sequence_id");
        check(
            &mut invalid,
            self.sequence_open_tracking_enabled.is_some(),
            "sequence_open_tracking_enabled",
        );
        check(
            &mut invalid,
            self.sequence_click_tracking_enabled.is_some(),
            "sequence_click_tracking_enabled",
        );

        match (
            self.sequence_open_tracking_enabled,
            self.sequence_click_tracking_enabled,
        ) {
            (Some(open), Some(click)) if invalid.is_empty() => Ok(SequenceTrackingUpdate {
                account_id: self.account_id,
                sequence_id: self.sequence_id,
                sequence_open_tracking_enabled: open,
                sequence_click_tracking_enabled: click,
            }),
            _ => Err(invalid),
        }
    }
}

// ---------------------------------------------------------------------------
// PUT /v1/step
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateStepRequest {
    pub account_id: i64,
    pub sequence_id: i64,
    pub step_id: i64,
    pub step_email_subject: String,
    pub step_email_body: String,
}

impl ValidatedRequest for UpdateStepRequest {
    type Output = StepContentUpdate;

    fn validate(self) -> Result<Self::Output, Vec<&'static str>> {
        let mut invalid = Vec::new();
        check(&mut invalid, self.account_id > 0, "account_id");
        check(&mut invalid, self.step_id > 0, "step_id");
        check(&mut invalid, self.sequence_id > 0, "sequence_id");
        check(&mut invalid, !self.step_email_subject.is_empty(), "step_email_subject");
        check(&mut invalid, !self.step_email_body.is_empty(), "step_email_body");
        if !invalid.is_empty() {
            return Err(invalid);
        }

        Ok(StepContentUpdate {
            key: StepKey {
                account_id: self.account_id,
                sequence_id: self.sequence_id,
                step_id: self.step_id,
            },
            step_email_subject: self.step_email_subject,
            step_email_body: self.step_email_body,
        })
    }
}

// ---------------------------------------------------------------------------
// DELETE /v1/step
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeleteStepRequest {
    pub account_id: i64,
    pub sequence_id: i64,
    pub step_id: i64,
}

impl ValidatedRequest for DeleteStepRequest {
    type Output = StepKey;

    fn validate(self) -> Result<Self::Output, Vec<&'static str>> {
        let mut invalid = Vec::new();
        check(&mut invalid, self.account_id > 0, "account_id");
        check(&mut invalid, self.step_id > 0, "step_id");
        check(&mut invalid, self.sequence_id > 0, "sequence_id");
        if !invalid.is_empty() {
            return Err(invalid);
        }

        Ok(StepKey {
            account_id: self.account_id,
            sequence_id: self.sequence_id,
            step_id: self.step_id,
        })
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

pub const STATUS_OK: &str = "ok";

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SequenceResponse {
    pub sequence_id: i64,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StepResponse {
    pub sequence_id: i64,
    pub step_id: i64,
    pub status: String,
}
