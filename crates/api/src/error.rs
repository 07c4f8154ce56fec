//! HTTP-facing error type.
//!
//! Decode and validation failures map to 400. Every service failure maps to
//! 500, whether the store reported not-found or a storage fault; the kind is
//! only visible in the logs.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use service::ServiceError;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid parameters: {}", .fields.join(", "))]
    Validation { fields: Vec<&'static str> },

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Decode(_) | Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Service(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Decode(_) | Self::Validation { .. } => {
                warn!(error = %self, "invalid request payload");
                (status, "Invalid request").into_response()
            }
            Self::Service(err) => {
                error!(
                    operation = err.operation(),
                    kind = ?err.kind(),
                    error = %err,
                    "error processing request"
                );
                (status, "An error occurred").into_response()
            }
        }
    }
}
