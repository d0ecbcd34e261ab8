//! JSON API stub.

use axum::{Json, extract::State};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct DataResponse {
    pub message: String,
    pub timestamp: String,
    pub online: bool,
}

pub async fn data(State(state): State<Arc<AppState>>) -> Json<DataResponse> {
    Json(DataResponse {
        message: state.config.api_message.clone(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        online: true,
    })
}
