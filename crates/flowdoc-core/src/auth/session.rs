use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::config::{Config, TokenStoreKind};

use super::{FileTokenStore, KeyringTokenStore, TokenStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn age(&self) -> Duration {
        Utc::now() - self.created_at
    }
}

/// The user's session: a single token slot behind a `TokenStore`.
///
/// A `Session` is owned by whoever drives the client and handed to
/// network calls explicitly; there is no global token.
pub struct Session {
    store: Box<dyn TokenStore>,
}

impl Session {
    pub fn new(store: impl TokenStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Open the session in the store the configuration selects
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(match config.token_store {
            TokenStoreKind::File => Self::new(FileTokenStore::new(&config.cache_dir()?)),
            TokenStoreKind::Keyring => Self::new(KeyringTokenStore::new()?),
        })
    }

    /// Send credentials to the backend and, on success, replace the
    /// stored session with the returned token.
    ///
    /// On failure the error is returned and storage is left untouched.
    pub async fn login(&self, api: &ApiClient, username: &str, password: &str) -> Result<()> {
        let data = api.authenticate(username, password).await?;
        self.store.save(&data)?;
        info!(username, "Logged in");
        Ok(())
    }

    /// Remove any stored session. Safe to call when logged out.
    pub fn logout(&self) -> Result<()> {
        self.store.clear()?;
        info!("Logged out");
        Ok(())
    }

    /// Stored session record, if any. Unreadable storage counts as absent.
    pub fn data(&self) -> Option<SessionData> {
        match self.store.load() {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "Failed to load session");
                None
            }
        }
    }

    /// The stored bearer token, if any
    pub fn token(&self) -> Option<String> {
        self.data().map(|d| d.token)
    }

    /// Whether a token is stored. The token is not checked with the backend.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Derive a client that carries this session's token.
    pub fn authorize(&self, api: &ApiClient) -> Result<ApiClient> {
        match self.token() {
            Some(token) => Ok(api.with_token(token)),
            None => Err(anyhow::anyhow!("Not authenticated. Run `flowdoc login` first.")),
        }
    }
}
