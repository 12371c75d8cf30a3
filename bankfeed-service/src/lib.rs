pub mod config;
pub mod handlers;
pub mod models;
pub mod services;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::middleware::from_fn;
use axum::{
    routing::{get, post},
    Router,
};
use connector_core::middleware::tracing::request_id_middleware;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use config::{Config, ProviderKind};
use services::{BankProvider, PlaidClient, SessionStore, SimplefinClient};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: SessionStore,
    pub provider: Arc<dyn BankProvider>,
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        // One HTTP client for all provider calls, carrying the configured
        // timeout (reqwest has no overall timeout by default).
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        let provider: Arc<dyn BankProvider> = match config.provider {
            ProviderKind::Plaid => {
                let client = PlaidClient::new(http, config.plaid.clone());
                if client.is_configured() {
                    tracing::info!("Plaid client initialized");
                } else {
                    tracing::warn!(
                        "Plaid credentials not configured - connect will fail until they are set"
                    );
                }
                Arc::new(client)
            }
            ProviderKind::Simplefin => {
                Arc::new(SimplefinClient::new(http, config.simplefin.clone()))
            }
        };

        let state = AppState {
            config: config.clone(),
            store: SessionStore::new(),
            provider,
        };

        let router = Router::new()
            .route("/api/health", get(handlers::health_check))
            .route("/api/create-link-token", post(handlers::link::create_link_token))
            .route("/api/exchange-token", post(handlers::link::exchange_token))
            .route("/api/connect", post(handlers::link::connect))
            .route("/api/status", get(handlers::link::status))
            .route("/api/accounts", get(handlers::data::accounts))
            .route("/api/transactions", get(handlers::data::transactions))
            .route("/api/disconnect", post(handlers::link::disconnect))
            // The front-end runs on a separate origin during development.
            .layer(CorsLayer::permissive())
            .layer(from_fn(request_id_middleware))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");

                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                }),
            )
            .with_state(state);

        // Bind eagerly so port 0 resolves to a concrete port for tests.
        let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
        let listener = TcpListener::bind(addr).await?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        tracing::info!("Listening on port {}", self.port);
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }
}
