use anyhow::{anyhow, Result};
use dotenvy::dotenv;
use secrecy::Secret;
use std::env;
use std::time::Duration;

/// Which aggregation provider this process proxies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    Plaid,
    Simplefin,
}

impl std::str::FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "plaid" => Ok(ProviderKind::Plaid),
            "simplefin" => Ok(ProviderKind::Simplefin),
            other => Err(anyhow!("unknown provider: {}", other)),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Plaid => write!(f, "plaid"),
            ProviderKind::Simplefin => write!(f, "simplefin"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub provider: ProviderKind,
    /// Timeout applied to every outbound provider request.
    pub http_timeout: Duration,
    pub plaid: PlaidConfig,
    pub simplefin: SimplefinConfig,
    pub service_name: String,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct PlaidConfig {
    pub client_id: String,
    pub secret: Secret<String>,
    pub base_url: String,
    /// Optional environment-supplied access token used for auto-connect.
    pub default_access_token: Option<Secret<String>>,
}

#[derive(Clone, Debug, Default)]
pub struct SimplefinConfig {
    /// Optional one-time setup token claimed on the first auto-connect.
    pub default_setup_token: Option<Secret<String>>,
    /// Optional pre-claimed access URL (takes precedence over the setup token).
    pub default_access_url: Option<Secret<String>>,
}

fn plaid_base_url(environment: &str) -> String {
    // Plaid hosts one API per environment; sandbox is the safe default.
    match environment {
        "production" => "https://production.plaid.com".to_string(),
        "development" => "https://development.plaid.com".to_string(),
        _ => "https://sandbox.plaid.com".to_string(),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let host = env::var("BANKFEED_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("BANKFEED_PORT")
            .unwrap_or_else(|_| "3001".to_string())
            .parse()?;

        let provider: ProviderKind = env::var("BANKFEED_PROVIDER")
            .unwrap_or_else(|_| "plaid".to_string())
            .parse()?;

        let http_timeout_secs: u64 = env::var("BANKFEED_HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()?;

        let plaid_env = env::var("PLAID_ENV").unwrap_or_else(|_| "sandbox".to_string());
        let plaid = PlaidConfig {
            client_id: env::var("PLAID_CLIENT_ID").unwrap_or_default(),
            secret: Secret::new(env::var("PLAID_SECRET").unwrap_or_default()),
            base_url: env::var("PLAID_BASE_URL").unwrap_or_else(|_| plaid_base_url(&plaid_env)),
            default_access_token: env::var("PLAID_ACCESS_TOKEN").ok().map(Secret::new),
        };

        let simplefin = SimplefinConfig {
            default_setup_token: env::var("SIMPLEFIN_SETUP_TOKEN").ok().map(Secret::new),
            default_access_url: env::var("SIMPLEFIN_ACCESS_URL").ok().map(Secret::new),
        };

        Ok(Self {
            server: ServerConfig { host, port },
            provider,
            http_timeout: Duration::from_secs(http_timeout_secs),
            plaid,
            simplefin,
            service_name: "bankfeed-service".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_kind_parses_case_insensitively() {
        assert_eq!("Plaid".parse::<ProviderKind>().unwrap(), ProviderKind::Plaid);
        assert_eq!(
            "SIMPLEFIN".parse::<ProviderKind>().unwrap(),
            ProviderKind::Simplefin
        );
        assert!("mint".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn plaid_base_url_defaults_to_sandbox() {
        assert_eq!(plaid_base_url("sandbox"), "https://sandbox.plaid.com");
        assert_eq!(plaid_base_url("bogus"), "https://sandbox.plaid.com");
        assert_eq!(plaid_base_url("production"), "https://production.plaid.com");
    }
}
