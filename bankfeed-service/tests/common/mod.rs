use bankfeed_service::config::{
    Config, PlaidConfig, ProviderKind, ServerConfig, SimplefinConfig,
};
use bankfeed_service::Application;
use secrecy::Secret;
use std::time::Duration;

pub struct TestApp {
    pub address: String,
    pub port: u16,
}

impl TestApp {
    pub async fn spawn(config: Config) -> Self {
        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/api/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        TestApp { address, port }
    }

    pub async fn spawn_plaid(provider_base_url: &str) -> Self {
        Self::spawn(plaid_config(provider_base_url, None)).await
    }

    pub async fn spawn_simplefin(config: SimplefinConfig) -> Self {
        Self::spawn(simplefin_config(config)).await
    }
}

pub fn plaid_config(base_url: &str, default_access_token: Option<String>) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Random port
        },
        provider: ProviderKind::Plaid,
        http_timeout: Duration::from_secs(5),
        plaid: PlaidConfig {
            client_id: "test-client-id".to_string(),
            secret: Secret::new("test-secret".to_string()),
            base_url: base_url.to_string(),
            default_access_token: default_access_token.map(Secret::new),
        },
        simplefin: SimplefinConfig {
            default_setup_token: None,
            default_access_url: None,
        },
        service_name: "bankfeed-service-test".to_string(),
    }
}

pub fn simplefin_config(simplefin: SimplefinConfig) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        provider: ProviderKind::Simplefin,
        http_timeout: Duration::from_secs(5),
        plaid: PlaidConfig {
            client_id: String::new(),
            secret: Secret::new(String::new()),
            base_url: "https://sandbox.plaid.com".to_string(),
            default_access_token: None,
        },
        simplefin,
        service_name: "bankfeed-service-test".to_string(),
    }
}
