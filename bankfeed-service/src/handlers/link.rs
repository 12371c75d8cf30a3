//! Connect / status / disconnect handlers.
//!
//! These drive the credential lifecycle: Disconnected -> Connecting ->
//! Connected on a successful connect, back to Disconnected on disconnect.
//! A failed connect leaves the store untouched.

use axum::{extract::State, Json};
use connector_core::error::AppError;
use serde::Serialize;
use serde_json::json;

use crate::services::{ConnectRequest, DEFAULT_SESSION};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct LinkTokenResponse {
    pub link_token: String,
}

/// Create a short-lived link token for the front-end link widget.
/// Returns 400 for providers without an exchange flow.
pub async fn create_link_token(
    State(state): State<AppState>,
) -> Result<Json<LinkTokenResponse>, AppError> {
    let link_token = state.provider.create_link_token().await?;
    Ok(Json(LinkTokenResponse { link_token }))
}

/// Exchange a public token for a long-lived credential (Plaid flow).
///
/// Kept as a separate route so the front-end's exchange step has a stable
/// path; it shares the connect implementation.
pub async fn exchange_token(
    State(state): State<AppState>,
    Json(payload): Json<ConnectRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    connect(State(state), Json(payload)).await
}

/// Connect using client-supplied input, falling back to configured
/// defaults where the provider supports it.
pub async fn connect(
    State(state): State<AppState>,
    Json(payload): Json<ConnectRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    tracing::info!(provider = state.provider.name(), "Connect requested");

    let credential = state.provider.connect(payload).await?;
    state.store.put(DEFAULT_SESSION, credential).await;

    tracing::info!(provider = state.provider.name(), "Connected");
    Ok(Json(json!({ "success": true })))
}

pub async fn status(State(state): State<AppState>) -> Json<serde_json::Value> {
    let connected = state.store.is_connected(DEFAULT_SESSION).await;
    Json(json!({ "connected": connected }))
}

/// Clear the held credential, then run best-effort provider-side teardown.
pub async fn disconnect(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let credential = state
        .store
        .clear(DEFAULT_SESSION)
        .await
        .ok_or(AppError::NotConnected)?;

    state.provider.disconnect(&credential).await;

    tracing::info!(provider = state.provider.name(), "Disconnected");
    Ok(Json(json!({ "success": true })))
}
