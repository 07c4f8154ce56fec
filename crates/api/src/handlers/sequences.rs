use axum::{body::Bytes, extract::State, Json};
use tracing::info;

use super::AppState;
use crate::requests::{
    decode, AddSequenceRequest, SequenceResponse, UpdateSequenceRequest, STATUS_OK,
};
use crate::ApiError;

pub async fn add_sequence(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SequenceResponse>, ApiError> {
    info!("AddSequence request received");
    let (sequence, steps) = decode::<AddSequenceRequest>(&body)?;

    let sequence_id = state.service.add_sequence(&sequence, &steps).await?;

    Ok(Json(SequenceResponse {
        sequence_id,
        status: STATUS_OK.into(),
    }))
}

pub async fn update_sequence(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SequenceResponse>, ApiError> {
    info!("UpdateSequence request received");
    let update = decode::<UpdateSequenceRequest>(&body)?;

    let sequence_id = state.service.update_sequence(&update).await?;

    Ok(Json(SequenceResponse {
        sequence_id,
        status: STATUS_OK.into(),
    }))
}
