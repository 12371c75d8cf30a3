//! SimpleFIN provider client (direct-access flow).
//!
//! A setup token is the base64 of a one-time claim URL. Claiming it (a
//! single empty POST) returns a permanent access URL with Basic-Auth
//! credentials embedded; all data queries hit `{access_url}/accounts`.
//! SimpleFIN reports debits as negative amounts, so normalization inverts
//! the sign to match our spend-positive convention.

use anyhow::anyhow;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use connector_core::error::AppError;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use crate::config::SimplefinConfig;
use crate::models::{Account, Balance, Transaction};
use crate::services::categorize::categorize;
use crate::services::provider::{BankProvider, ConnectRequest};
use crate::services::session::Credential;

/// Trailing lookback window for transaction queries. SimpleFIN bridges
/// commonly serve up to 90 days; 60 keeps payloads small.
const LOOKBACK_DAYS: i64 = 60;

#[derive(Clone)]
pub struct SimplefinClient {
    http: Client,
    config: SimplefinConfig,
}

#[derive(Debug, Deserialize)]
struct SimplefinOrg {
    name: Option<String>,
    domain: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SimplefinTransaction {
    id: String,
    /// Unix seconds.
    posted: i64,
    /// Decimal string, debit-negative in SimpleFIN's convention.
    amount: String,
    description: String,
    payee: Option<String>,
    #[serde(default)]
    pending: bool,
}

#[derive(Debug, Deserialize)]
struct SimplefinAccount {
    id: String,
    name: String,
    balance: String,
    #[serde(rename = "available-balance")]
    available_balance: Option<String>,
    org: Option<SimplefinOrg>,
    #[serde(default)]
    transactions: Vec<SimplefinTransaction>,
}

#[derive(Debug, Deserialize)]
struct AccountSet {
    #[serde(default)]
    errors: Vec<String>,
    accounts: Vec<SimplefinAccount>,
}

/// Decode a setup token into its claim URL.
fn decode_setup_token(setup_token: &str) -> Result<String, AppError> {
    let bytes = BASE64
        .decode(setup_token.trim().as_bytes())
        .map_err(|e| AppError::InvalidInput(anyhow!("setup token is not valid base64: {}", e)))?;
    let claim_url = String::from_utf8(bytes)
        .map_err(|_| AppError::InvalidInput(anyhow!("setup token does not decode to a URL")))?;

    if !claim_url.starts_with("http") {
        return Err(AppError::InvalidInput(anyhow!(
            "setup token does not decode to a URL"
        )));
    }
    Ok(claim_url.trim().to_string())
}

fn parse_amount(raw: &str) -> Result<f64, AppError> {
    raw.parse::<f64>()
        .map_err(|_| AppError::ProviderError(anyhow!("unparseable amount: {:?}", raw)))
}

fn posted_date(posted: i64) -> Result<NaiveDate, AppError> {
    DateTime::<Utc>::from_timestamp(posted, 0)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| AppError::ProviderError(anyhow!("invalid posted timestamp: {}", posted)))
}

impl SimplefinClient {
    pub fn new(http: Client, config: SimplefinConfig) -> Self {
        Self { http, config }
    }

    /// Claim a setup token, returning the permanent access URL.
    ///
    /// Claiming is one-shot on the provider side: a second claim of the
    /// same token fails.
    async fn claim(&self, setup_token: &str) -> Result<Credential, AppError> {
        let claim_url = decode_setup_token(setup_token)?;

        let response = self
            .http
            .post(&claim_url)
            .header(reqwest::header::CONTENT_LENGTH, "0")
            .send()
            .await
            .map_err(|e| AppError::ProviderError(anyhow!("claim request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::ProviderError(e.into()))?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(200).collect::<String>(),
                "SimpleFIN claim failed"
            );
            return Err(AppError::ProviderError(anyhow!(
                "claim rejected with status {}",
                status
            )));
        }

        let access_url = body.trim().to_string();
        if !access_url.starts_with("http") {
            return Err(AppError::ProviderError(anyhow!(
                "claim did not return an access URL"
            )));
        }

        tracing::info!("SimpleFIN setup token claimed");
        Ok(Credential::SimplefinAccessUrl(Secret::new(access_url)))
    }

    /// Fetch the account set, optionally with a transaction window.
    async fn fetch_accounts(
        &self,
        credential: &Credential,
        start_date: Option<NaiveDate>,
    ) -> Result<AccountSet, AppError> {
        let access_url = match credential {
            Credential::SimplefinAccessUrl(url) => url.expose_secret(),
            Credential::PlaidAccessToken(_) => {
                return Err(AppError::InternalError(anyhow!(
                    "Plaid credential supplied to the SimpleFIN provider"
                )))
            }
        };

        // Basic-Auth credentials are embedded in the access URL; reqwest
        // wants them as an explicit header.
        let mut url = Url::parse(access_url)
            .map_err(|e| AppError::InternalError(anyhow!("stored access URL is invalid: {}", e)))?;
        let username = url.username().to_string();
        let password = url.password().map(|p| p.to_string());
        url.set_username("")
            .and_then(|_| url.set_password(None))
            .map_err(|_| AppError::InternalError(anyhow!("stored access URL is invalid")))?;

        let accounts_url = format!("{}/accounts", url.as_str().trim_end_matches('/'));

        let mut request = self.http.get(&accounts_url).basic_auth(username, password);
        if let Some(start) = start_date {
            let start_ts = start
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp())
                .unwrap_or_default();
            request = request.query(&[("start-date", start_ts.to_string())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::ProviderError(anyhow!("accounts request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::ProviderError(e.into()))?;

        tracing::debug!(status = %status, "SimpleFIN accounts response");

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(200).collect::<String>(),
                "SimpleFIN accounts request failed"
            );
            return Err(AppError::ProviderError(anyhow!(
                "accounts request rejected with status {}",
                status
            )));
        }

        let set: AccountSet = serde_json::from_str(&body)
            .map_err(|e| AppError::ProviderError(anyhow!("malformed account set: {}", e)))?;

        for message in &set.errors {
            tracing::warn!(message = %message, "SimpleFIN reported a non-fatal error");
        }

        Ok(set)
    }
}

#[async_trait]
impl BankProvider for SimplefinClient {
    fn name(&self) -> &'static str {
        "simplefin"
    }

    async fn create_link_token(&self) -> Result<String, AppError> {
        // SimpleFIN has no link widget; the front-end collects a setup
        // token from the user directly.
        Err(AppError::InvalidInput(anyhow!(
            "link tokens are not used by the simplefin provider"
        )))
    }

    async fn connect(&self, request: ConnectRequest) -> Result<Credential, AppError> {
        let setup_token = match request.setup_token {
            Some(token) => Secret::new(token),
            None => self
                .config
                .default_setup_token
                .clone()
                .ok_or_else(|| AppError::InvalidInput(anyhow!("missing field: setup_token")))?,
        };

        self.claim(setup_token.expose_secret()).await
    }

    async fn auto_connect(&self) -> Result<Option<Credential>, AppError> {
        if let Some(access_url) = &self.config.default_access_url {
            return Ok(Some(Credential::SimplefinAccessUrl(access_url.clone())));
        }
        if let Some(setup_token) = &self.config.default_setup_token {
            // One-shot on the provider side; if a concurrent attempt won the
            // claim, this fails and the caller re-checks the store.
            return self.claim(setup_token.expose_secret()).await.map(Some);
        }
        Ok(None)
    }

    async fn accounts(&self, credential: &Credential) -> Result<Vec<Account>, AppError> {
        let set = self.fetch_accounts(credential, None).await?;

        set.accounts
            .into_iter()
            .map(|account| {
                let available = account
                    .available_balance
                    .as_deref()
                    .map(parse_amount)
                    .transpose()?;
                Ok(Account {
                    id: account.id,
                    name: account.name,
                    mask: None,
                    balance: Balance {
                        current: parse_amount(&account.balance)?,
                        available,
                    },
                    account_type: None,
                    institution: account
                        .org
                        .and_then(|org| org.name.or(org.domain)),
                })
            })
            .collect()
    }

    async fn transactions(&self, credential: &Credential) -> Result<Vec<Transaction>, AppError> {
        let start = Utc::now().date_naive() - Duration::days(LOOKBACK_DAYS);
        let set = self.fetch_accounts(credential, Some(start)).await?;

        let mut transactions = Vec::new();
        for account in set.accounts {
            for tx in account.transactions {
                // Invert the sign: SimpleFIN is debit-negative, our common
                // shape is spend-positive.
                let amount = -parse_amount(&tx.amount)?;
                transactions.push(Transaction {
                    id: tx.id,
                    account_id: account.id.clone(),
                    category: categorize(&tx.description),
                    merchant_name: tx.payee,
                    amount,
                    date: posted_date(tx.posted)?,
                    name: tx.description,
                    pending: tx.pending,
                });
            }
        }

        Ok(transactions)
    }

    async fn disconnect(&self, _credential: &Credential) {
        // SimpleFIN has no server-side revocation; clearing the local slot
        // is the whole operation.
        tracing::debug!("SimpleFIN disconnect is local-only");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_token_decodes_to_claim_url() {
        let claim_url = "https://bridge.example.com/simplefin/claim/demo";
        let token = BASE64.encode(claim_url);
        assert_eq!(decode_setup_token(&token).unwrap(), claim_url);
    }

    #[test]
    fn setup_token_tolerates_surrounding_whitespace() {
        let token = format!("  {}\n", BASE64.encode("https://example.com/claim"));
        assert_eq!(
            decode_setup_token(&token).unwrap(),
            "https://example.com/claim"
        );
    }

    #[test]
    fn garbage_setup_token_is_invalid_input() {
        let err = decode_setup_token("!!not-base64!!").unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        // Valid base64 that is not a URL is rejected too.
        let err = decode_setup_token(&BASE64.encode("hello world")).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn amounts_parse_from_decimal_strings() {
        assert_eq!(parse_amount("-4.50").unwrap(), -4.50);
        assert_eq!(parse_amount("1200").unwrap(), 1200.0);
        assert!(parse_amount("4,50").is_err());
    }

    #[test]
    fn posted_timestamps_become_calendar_dates() {
        // 2024-06-15T12:00:00Z
        assert_eq!(
            posted_date(1718452800).unwrap(),
            "2024-06-15".parse::<NaiveDate>().unwrap()
        );
    }
}
