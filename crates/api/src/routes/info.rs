//! Block description routes

use axum::{extract::State, Json};
use feature_engine::BlockDescriptor;
use std::sync::Arc;

use crate::AppState;

/// Plain-text banner
pub async fn index(State(state): State<Arc<AppState>>) -> String {
    let info = &state.descriptor.info;
    format!(
        "{} (implementation version {}, server {})\n{}\n",
        info.title, info.latest_implementation_version, state.version, info.description
    )
}

/// Parameter descriptor
pub async fn parameters(State(state): State<Arc<AppState>>) -> Json<BlockDescriptor> {
    Json(state.descriptor.clone())
}
