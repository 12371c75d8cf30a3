//! Provider seam.
//!
//! The HTTP handlers are provider-agnostic; everything provider-specific
//! lives behind [`BankProvider`]. Exactly one implementation is active per
//! process, chosen by configuration at startup.

use async_trait::async_trait;
use connector_core::error::AppError;
use serde::Deserialize;

use crate::models::{Account, Transaction};
use crate::services::session::Credential;

/// Client-supplied connect input. Which field matters depends on the active
/// provider: Plaid consumes `public_token`, SimpleFIN consumes `setup_token`.
#[derive(Debug, Default, Deserialize)]
pub struct ConnectRequest {
    pub public_token: Option<String>,
    pub setup_token: Option<String>,
}

#[async_trait]
pub trait BankProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Create a short-lived link token for the front-end widget.
    /// Only meaningful for exchange-flow providers.
    async fn create_link_token(&self) -> Result<String, AppError>;

    /// Exchange client-supplied connect input for a long-lived credential.
    async fn connect(&self, request: ConnectRequest) -> Result<Credential, AppError>;

    /// Attempt a connect from an environment-supplied default source.
    /// `Ok(None)` means no default source is configured.
    async fn auto_connect(&self) -> Result<Option<Credential>, AppError>;

    async fn accounts(&self, credential: &Credential) -> Result<Vec<Account>, AppError>;

    /// All transactions across the provider's accounts for the trailing
    /// lookback window, normalized but not yet sorted.
    async fn transactions(&self, credential: &Credential) -> Result<Vec<Transaction>, AppError>;

    /// Provider-side teardown on disconnect. Best-effort: failures are
    /// logged by the implementation and never fail the disconnect.
    async fn disconnect(&self, credential: &Credential);
}
