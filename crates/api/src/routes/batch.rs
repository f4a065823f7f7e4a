//! Multi-window route

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use feature_engine::{BlockParameters, FeatureRequest, OutputConfig};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

use super::{default_implementation_version, ApiError};
use crate::AppState;

/// Body of `POST /batch`
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    /// One interleaved raw window per entry
    pub features: Vec<Vec<f64>>,
    pub axes: Vec<String>,
    pub sampling_freq: f64,
    #[serde(default = "default_implementation_version")]
    pub implementation_version: u32,
    #[serde(default)]
    pub params: Map<String, Value>,
}

/// Feature vectors for every window, without graphs
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub success: bool,
    pub features: Vec<Vec<f64>>,
    pub output_config: OutputConfig,
}

/// Extract features from many windows; the first failing window fails the batch
pub async fn batch(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<BatchResponse>, ApiError> {
    let Json(body) = payload?;
    let params = BlockParameters::from_map(&body.params)?;
    debug!(
        "Batch: {} windows over {} axes",
        body.features.len(),
        body.axes.len()
    );

    let response = tokio::task::spawn_blocking(move || {
        let mut features = Vec::with_capacity(body.features.len());
        let mut output_config = OutputConfig::flat(0);

        for window in body.features {
            let mut request = FeatureRequest::new(window, body.axes.clone(), body.sampling_freq)
                .with_params(params);
            request.implementation_version = body.implementation_version;

            let output = state.extractor.generate(&request)?;
            output_config = output.output_config;
            features.push(output.features);
        }

        Ok::<_, ApiError>(BatchResponse {
            success: true,
            features,
            output_config,
        })
    })
    .await??;

    Ok(Json(response))
}
