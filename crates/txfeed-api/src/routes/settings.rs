//! Settings API endpoints - JSON API

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::AppState;

/// Settings a client needs to reason about the feed, as actually served
pub async fn api_settings(state: State<AppState>) -> Json<Value> {
    Json(json!({
        "pagination": {
            "page_size": state.page_size,
        },
        "data": {
            "simulated_latency_ms": state.config.data.simulated_latency_ms,
        },
    }))
}
