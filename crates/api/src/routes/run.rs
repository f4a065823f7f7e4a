//! Single-window route

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use feature_engine::{BlockParameters, FeatureOutput, FeatureRequest};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

use super::{default_implementation_version, ApiError};
use crate::AppState;

/// Body of `POST /run`
#[derive(Debug, Deserialize)]
pub struct RunRequest {
    /// Interleaved raw window
    pub features: Vec<f64>,
    pub axes: Vec<String>,
    pub sampling_freq: f64,
    #[serde(default)]
    pub draw_graphs: bool,
    #[serde(default = "default_implementation_version")]
    pub implementation_version: u32,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl RunRequest {
    fn into_feature_request(self) -> Result<FeatureRequest, ApiError> {
        let params = BlockParameters::from_map(&self.params)?;
        let mut request = FeatureRequest::new(self.features, self.axes, self.sampling_freq)
            .with_params(params)
            .with_graphs(self.draw_graphs);
        request.implementation_version = self.implementation_version;
        Ok(request)
    }
}

/// Successful run, flattened next to the success flag
#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub success: bool,
    #[serde(flatten)]
    pub output: FeatureOutput,
}

/// Extract features from one window
pub async fn run(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RunRequest>, JsonRejection>,
) -> Result<Json<RunResponse>, ApiError> {
    let Json(body) = payload?;
    let request = body.into_feature_request()?;
    debug!(
        "Run: {} samples over {} axes at {} Hz",
        request.raw_data.len(),
        request.axes.len(),
        request.sampling_freq
    );

    let output =
        tokio::task::spawn_blocking(move || state.extractor.generate(&request)).await??;

    Ok(Json(RunResponse {
        success: true,
        output,
    }))
}
