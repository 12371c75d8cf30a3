//! HTTP handlers for bankfeed-service.

pub mod data;
pub mod link;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "bankfeed-service",
            "version": env!("CARGO_PKG_VERSION"),
            "provider": state.provider.name(),
        })),
    )
}
