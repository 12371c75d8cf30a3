//! Account and transaction read handlers.

use axum::{extract::State, Json};
use connector_core::error::AppError;
use serde::Serialize;

use crate::models::{sort_newest_first, Account, Transaction};
use crate::services::{Credential, DEFAULT_SESSION};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct AccountsResponse {
    pub accounts: Vec<Account>,
}

#[derive(Debug, Serialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<Transaction>,
}

/// Resolve the credential for this request, attempting an auto-connect from
/// the provider's configured default source when the store is empty.
///
/// Auto-connect is best-effort: failure degrades to `NotConnected` for this
/// request instead of surfacing the provider error. Two requests may race
/// here; the store keeps the first successful credential and a losing
/// attempt re-reads the slot before giving up (claiming a setup token twice
/// fails on the provider side).
async fn ensure_connected(state: &AppState) -> Result<Credential, AppError> {
    if let Some(credential) = state.store.get(DEFAULT_SESSION).await {
        return Ok(credential);
    }

    match state.provider.auto_connect().await {
        Ok(Some(credential)) => {
            tracing::info!(provider = state.provider.name(), "Auto-connected");
            Ok(state.store.put_if_absent(DEFAULT_SESSION, credential).await)
        }
        Ok(None) => Err(AppError::NotConnected),
        Err(e) => {
            if let Some(credential) = state.store.get(DEFAULT_SESSION).await {
                // A concurrent attempt won the race; use its credential.
                return Ok(credential);
            }
            tracing::warn!(
                provider = state.provider.name(),
                error = %e,
                "Auto-connect failed"
            );
            Err(AppError::NotConnected)
        }
    }
}

pub async fn accounts(State(state): State<AppState>) -> Result<Json<AccountsResponse>, AppError> {
    let credential = ensure_connected(&state).await?;
    let accounts = state.provider.accounts(&credential).await?;

    tracing::info!(count = accounts.len(), "Fetched accounts");
    Ok(Json(AccountsResponse { accounts }))
}

/// All transactions across accounts, flattened and sorted newest-first.
pub async fn transactions(
    State(state): State<AppState>,
) -> Result<Json<TransactionsResponse>, AppError> {
    let credential = ensure_connected(&state).await?;
    let mut transactions = state.provider.transactions(&credential).await?;

    sort_newest_first(&mut transactions);

    tracing::info!(count = transactions.len(), "Fetched transactions");
    Ok(Json(TransactionsResponse { transactions }))
}
