//! Route handlers

pub mod batch;
pub mod info;
pub mod run;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use feature_engine::{DspError, LATEST_IMPLEMENTATION_VERSION};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Failure returned to the caller as `{ "success": false, "error": ... }`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request body: {}", .0.body_text())]
    BadRequest(#[from] JsonRejection),

    #[error(transparent)]
    Dsp(#[from] DspError),

    #[error("Worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Dsp(e) if e.is_input_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error!("Request failed ({}): {}", status, self);

        let body = ErrorBody {
            success: false,
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

fn default_implementation_version() -> u32 {
    LATEST_IMPLEMENTATION_VERSION
}
