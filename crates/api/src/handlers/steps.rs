use axum::{body::Bytes, extract::State, Json};
use tracing::info;

use super::AppState;
use crate::requests::{decode, DeleteStepRequest, StepResponse, UpdateStepRequest, STATUS_OK};
use crate::ApiError;

pub async fn update_step(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StepResponse>, ApiError> {
    info!("UpdateStep request received");
    let update = decode::<UpdateStepRequest>(&body)?;

    let (sequence_id, step_id) = state.service.update_step(&update).await?;

    Ok(Json(StepResponse {
        sequence_id,
        step_id,
        status: STATUS_OK.into(),
    }))
}

pub async fn delete_step(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StepResponse>, ApiError> {
    info!("DeleteStep request received");
    let key = decode::<DeleteStepRequest>(&body)?;

    let (sequence_id, step_id) = state.service.delete_step(&key).await?;

    Ok(Json(StepResponse {
        sequence_id,
        step_id,
        status: STATUS_OK.into(),
    }))
}
