//! In-memory credential store.
//!
//! The service holds exactly one provider credential for its lifetime. The
//! store is keyed by a session id so tests can exercise isolation and a
//! multi-tenant extension stays cheap, but the HTTP surface only ever uses
//! [`DEFAULT_SESSION`]. Nothing is persisted; a restart loses the credential
//! (auto-connect from an environment-supplied default covers that case).

use secrecy::Secret;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Fixed session id used by the single-tenant HTTP handlers.
pub const DEFAULT_SESSION: &str = "default";

/// Long-lived provider credential.
#[derive(Clone, Debug)]
pub enum Credential {
    /// Plaid access token obtained by exchanging a public token.
    PlaidAccessToken(Secret<String>),
    /// SimpleFIN access URL with Basic-Auth credentials embedded.
    SimplefinAccessUrl(Secret<String>),
}

#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, Credential>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, session: &str) -> Option<Credential> {
        self.inner.read().await.get(session).cloned()
    }

    pub async fn is_connected(&self, session: &str) -> bool {
        self.inner.read().await.contains_key(session)
    }

    /// Store a credential from an explicit, user-driven connect.
    /// Last successful connect wins.
    pub async fn put(&self, session: &str, credential: Credential) {
        self.inner
            .write()
            .await
            .insert(session.to_string(), credential);
    }

    /// Store a credential unless one is already present, returning the
    /// credential that ended up in the slot.
    ///
    /// Auto-connect attempts race each other; a losing attempt must never
    /// replace a credential a concurrent winner already stored.
    pub async fn put_if_absent(&self, session: &str, credential: Credential) -> Credential {
        let mut slot = self.inner.write().await;
        slot.entry(session.to_string())
            .or_insert(credential)
            .clone()
    }

    /// Remove the credential. Returns the cleared credential, if any, so the
    /// caller can run provider-side teardown.
    pub async fn clear(&self, session: &str) -> Option<Credential> {
        self.inner.write().await.remove(session)
    }
}
