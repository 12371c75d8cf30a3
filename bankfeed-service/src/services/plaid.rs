//! Plaid provider client (credential exchange flow).
//!
//! Implements the link-token / public-token exchange handshake and the
//! balance and transactions endpoints, normalizing responses into the
//! common shapes. Plaid reports debits as positive amounts, which matches
//! our sign convention, so amounts pass through unchanged.

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use connector_core::error::AppError;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::config::PlaidConfig;
use crate::models::{Account, Balance, Transaction};
use crate::services::categorize::categorize;
use crate::services::provider::{BankProvider, ConnectRequest};
use crate::services::session::Credential;

/// Trailing lookback window for transaction queries.
const LOOKBACK_DAYS: i64 = 30;

/// Page size for /transactions/get. Pagination beyond one page is out of
/// scope; the window is short enough that one page covers normal usage.
const TRANSACTIONS_PAGE_SIZE: u32 = 500;

#[derive(Clone)]
pub struct PlaidClient {
    http: Client,
    config: PlaidConfig,
}

#[derive(Debug, Deserialize)]
struct LinkTokenCreateResponse {
    link_token: String,
}

#[derive(Debug, Deserialize)]
struct ExchangeTokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct PlaidBalances {
    available: Option<f64>,
    current: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PlaidAccount {
    account_id: String,
    name: String,
    mask: Option<String>,
    balances: PlaidBalances,
    #[serde(rename = "type")]
    account_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaidItem {
    institution_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BalanceGetResponse {
    accounts: Vec<PlaidAccount>,
    item: Option<PlaidItem>,
}

#[derive(Debug, Deserialize)]
struct PlaidTransaction {
    transaction_id: String,
    account_id: String,
    name: String,
    merchant_name: Option<String>,
    amount: f64,
    date: chrono::NaiveDate,
    category: Option<Vec<String>>,
    pending: bool,
}

#[derive(Debug, Deserialize)]
struct TransactionsGetResponse {
    transactions: Vec<PlaidTransaction>,
}

/// Plaid API error body.
#[derive(Debug, Deserialize)]
struct PlaidErrorBody {
    error_type: String,
    error_code: String,
    error_message: String,
}

impl PlaidClient {
    pub fn new(http: Client, config: PlaidConfig) -> Self {
        Self { http, config }
    }

    /// Check if Plaid credentials are set.
    pub fn is_configured(&self) -> bool {
        !self.config.client_id.is_empty() && !self.config.secret.expose_secret().is_empty()
    }

    /// POST to a Plaid endpoint with client credentials merged into the body.
    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        mut body: serde_json::Value,
    ) -> Result<T, AppError> {
        if !self.is_configured() {
            return Err(AppError::ConfigError(anyhow!(
                "Plaid credentials not configured"
            )));
        }

        body["client_id"] = json!(self.config.client_id);
        body["secret"] = json!(self.config.secret.expose_secret());

        let url = format!("{}{}", self.config.base_url, path);

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ProviderError(anyhow!("request to {} failed: {}", path, e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::ProviderError(e.into()))?;

        tracing::debug!(path = %path, status = %status, "Plaid response");

        if status.is_success() {
            serde_json::from_str(&text).map_err(|e| {
                AppError::ProviderError(anyhow!("malformed response from {}: {}", path, e))
            })
        } else {
            let error: PlaidErrorBody =
                serde_json::from_str(&text).unwrap_or_else(|_| PlaidErrorBody {
                    error_type: "UNKNOWN".to_string(),
                    error_code: status.as_str().to_string(),
                    error_message: text.chars().take(200).collect(),
                });
            tracing::error!(
                path = %path,
                status = %status,
                error_type = %error.error_type,
                error_code = %error.error_code,
                error_message = %error.error_message,
                "Plaid request failed"
            );
            Err(AppError::ProviderError(anyhow!(
                "{} {}: {}",
                error.error_type,
                error.error_code,
                error.error_message
            )))
        }
    }

    fn access_token<'a>(&self, credential: &'a Credential) -> Result<&'a str, AppError> {
        match credential {
            Credential::PlaidAccessToken(token) => Ok(token.expose_secret()),
            Credential::SimplefinAccessUrl(_) => Err(AppError::InternalError(anyhow!(
                "SimpleFIN credential supplied to the Plaid provider"
            ))),
        }
    }
}

#[async_trait]
impl BankProvider for PlaidClient {
    fn name(&self) -> &'static str {
        "plaid"
    }

    async fn create_link_token(&self) -> Result<String, AppError> {
        let response: LinkTokenCreateResponse = self
            .post(
                "/link/token/create",
                json!({
                    "client_name": "bankfeed",
                    "user": { "client_user_id": "bankfeed-user" },
                    "products": ["transactions"],
                    "country_codes": ["US"],
                    "language": "en",
                }),
            )
            .await?;

        tracing::info!("Plaid link token created");
        Ok(response.link_token)
    }

    async fn connect(&self, request: ConnectRequest) -> Result<Credential, AppError> {
        let public_token = request
            .public_token
            .ok_or_else(|| AppError::InvalidInput(anyhow!("missing field: public_token")))?;

        let response: ExchangeTokenResponse = self
            .post(
                "/item/public_token/exchange",
                json!({ "public_token": public_token }),
            )
            .await?;

        tracing::info!("Plaid public token exchanged");
        Ok(Credential::PlaidAccessToken(Secret::new(
            response.access_token,
        )))
    }

    async fn auto_connect(&self) -> Result<Option<Credential>, AppError> {
        // A pre-issued access token is already long-lived; no exchange needed.
        Ok(self
            .config
            .default_access_token
            .as_ref()
            .map(|token| Credential::PlaidAccessToken(token.clone())))
    }

    async fn accounts(&self, credential: &Credential) -> Result<Vec<Account>, AppError> {
        let token = self.access_token(credential)?;

        let response: BalanceGetResponse = self
            .post("/accounts/balance/get", json!({ "access_token": token }))
            .await?;

        let institution = response.item.and_then(|item| item.institution_id);

        let accounts = response
            .accounts
            .into_iter()
            .map(|account| Account {
                id: account.account_id,
                name: account.name,
                mask: account.mask,
                balance: Balance {
                    current: account.balances.current.unwrap_or(0.0),
                    available: account.balances.available,
                },
                account_type: account.account_type,
                institution: institution.clone(),
            })
            .collect();

        Ok(accounts)
    }

    async fn transactions(&self, credential: &Credential) -> Result<Vec<Transaction>, AppError> {
        let token = self.access_token(credential)?;

        let end = Utc::now().date_naive();
        let start = end - Duration::days(LOOKBACK_DAYS);

        let response: TransactionsGetResponse = self
            .post(
                "/transactions/get",
                json!({
                    "access_token": token,
                    "start_date": start.to_string(),
                    "end_date": end.to_string(),
                    "options": { "count": TRANSACTIONS_PAGE_SIZE, "offset": 0 },
                }),
            )
            .await?;

        let transactions = response
            .transactions
            .into_iter()
            .map(|tx| {
                // Plaid's own categories win when present; otherwise fall
                // back to keyword categorization of the description.
                let category = match tx.category {
                    Some(category) if !category.is_empty() => category,
                    _ => categorize(&tx.name),
                };
                Transaction {
                    id: tx.transaction_id,
                    account_id: tx.account_id,
                    name: tx.name,
                    merchant_name: tx.merchant_name,
                    amount: tx.amount,
                    date: tx.date,
                    category,
                    pending: tx.pending,
                }
            })
            .collect();

        Ok(transactions)
    }

    async fn disconnect(&self, credential: &Credential) {
        let Ok(token) = self.access_token(credential) else {
            return;
        };

        // Best-effort: the local slot is cleared regardless of the outcome.
        match self
            .post::<serde_json::Value>("/item/remove", json!({ "access_token": token }))
            .await
        {
            Ok(_) => tracing::info!("Plaid item removed"),
            Err(e) => tracing::warn!(error = %e, "Plaid item removal failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(base_url: &str) -> PlaidConfig {
        PlaidConfig {
            client_id: "client-123".to_string(),
            secret: Secret::new("secret-456".to_string()),
            base_url: base_url.to_string(),
            default_access_token: None,
        }
    }

    #[test]
    fn is_configured_requires_both_credentials() {
        let client = PlaidClient::new(Client::new(), test_config("https://sandbox.plaid.com"));
        assert!(client.is_configured());

        let empty = PlaidConfig {
            client_id: String::new(),
            secret: Secret::new(String::new()),
            base_url: "https://sandbox.plaid.com".to_string(),
            default_access_token: None,
        };
        let client = PlaidClient::new(Client::new(), empty);
        assert!(!client.is_configured());
    }

    #[tokio::test]
    async fn auto_connect_without_default_token_is_none() {
        let client = PlaidClient::new(Client::new(), test_config("https://sandbox.plaid.com"));
        let credential = client.auto_connect().await.unwrap();
        assert!(credential.is_none());
    }

    #[tokio::test]
    async fn auto_connect_uses_configured_access_token() {
        let mut config = test_config("https://sandbox.plaid.com");
        config.default_access_token = Some(Secret::new("access-env".to_string()));
        let client = PlaidClient::new(Client::new(), config);

        let credential = client.auto_connect().await.unwrap().unwrap();
        match credential {
            Credential::PlaidAccessToken(token) => {
                assert_eq!(token.expose_secret(), "access-env")
            }
            _ => panic!("expected a Plaid access token"),
        }
    }

    #[tokio::test]
    async fn connect_requires_public_token() {
        let client = PlaidClient::new(Client::new(), test_config("https://sandbox.plaid.com"));
        let err = client.connect(ConnectRequest::default()).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
