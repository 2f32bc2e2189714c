//! Session bootstrap and browser storage state
//!
//! The suite authenticates once, before any scenario runs. [`bootstrap`]
//! performs the API login and yields an immutable [`Session`]; the runner
//! derives a Playwright-compatible [`StorageState`] snapshot from it so every
//! browser context starts already signed in, without replaying the login UI.
//!
//! A login that does not produce a token is a hard setup failure. An empty
//! token written into the snapshot would only surface later, as unrelated
//! assertion failures deep inside scenarios.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::ConduitClient;
use crate::error::{Error, Result};
use crate::types::User;

/// Environment variable the session token is exported to.
///
/// Nothing in this repository reads it back; it is kept as a side channel
/// for external tooling.
pub const ACCESS_TOKEN_ENV: &str = "ACCESS_TOKEN";

/// localStorage key the Conduit frontend reads its JWT from
pub const TOKEN_STORAGE_KEY: &str = "jwtToken";

/// Login credentials for the test user
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Read credentials from `CONDUIT_EMAIL` / `CONDUIT_PASSWORD`
    pub fn from_env() -> Result<Self> {
        let email = std::env::var("CONDUIT_EMAIL")
            .map_err(|_| Error::InvalidConfig("CONDUIT_EMAIL is not set".to_string()))?;
        let password = std::env::var("CONDUIT_PASSWORD")
            .map_err(|_| Error::InvalidConfig("CONDUIT_PASSWORD is not set".to_string()))?;
        Ok(Self { email, password })
    }
}

/// An authenticated session, immutable once established
#[derive(Debug, Clone)]
pub struct Session {
    token: String,
    user: User,
}

impl Session {
    /// The session token issued by the auth endpoint
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The user record returned at login
    pub fn user(&self) -> &User {
        &self.user
    }

    /// Derive a browser storage state that signs the given origin in
    pub fn storage_state(&self, origin: &str) -> StorageState {
        StorageState {
            origins: vec![OriginState {
                origin: origin.trim_end_matches('/').to_string(),
                local_storage: vec![StorageEntry {
                    name: TOKEN_STORAGE_KEY.to_string(),
                    value: self.token.clone(),
                }],
            }],
        }
    }

    /// Export the token to the process environment (`ACCESS_TOKEN`)
    pub fn export_env(&self) {
        std::env::set_var(ACCESS_TOKEN_ENV, &self.token);
    }
}

/// Log in and establish a session.
///
/// Fails with [`Error::MissingToken`] when the response carries no token,
/// rather than letting an empty credential leak into the snapshot.
pub async fn bootstrap(client: &ConduitClient, credentials: &Credentials) -> Result<Session> {
    let user = client
        .login(&credentials.email, &credentials.password)
        .await?;

    if user.token.is_empty() {
        return Err(Error::MissingToken);
    }

    info!("session established for {}", user.email);
    Ok(Session {
        token: user.token.clone(),
        user,
    })
}

/// Persisted browser storage snapshot in Playwright's `storageState` format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageState {
    pub origins: Vec<OriginState>,
}

/// Storage entries for one origin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OriginState {
    pub origin: String,
    #[serde(rename = "localStorage")]
    pub local_storage: Vec<StorageEntry>,
}

/// A single localStorage key/value pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageEntry {
    pub name: String,
    pub value: String,
}

impl StorageState {
    /// The session token held in the first entry of the first origin
    pub fn token(&self) -> Result<&str> {
        self.origins
            .first()
            .and_then(|o| o.local_storage.first())
            .map(|e| e.value.as_str())
            .ok_or(Error::EmptyStorageState)
    }

    /// Write the snapshot as pretty JSON, creating parent directories
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a previously written snapshot
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
