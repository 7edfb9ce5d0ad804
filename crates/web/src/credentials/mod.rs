//! Credential store for the session token.
//!
//! One token slot per browser, under the fixed key [`TOKEN_KEY`]. The store
//! never validates token contents. Storage failures are caught here,
//! forwarded to telemetry, and degrade to "no token" so callers fail safe to
//! the unauthenticated state.

mod memory;
mod session;
mod token;

use std::future::Future;

use thiserror::Error;

use crate::telemetry::SharedTelemetry;

pub use memory::MemoryStorage;
pub use token::SessionToken;

/// Storage key holding the session token.
pub const TOKEN_KEY: &str = "token";

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The session layer failed to read or write.
    #[error("Session storage error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// The backend could not be reached.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Persistent key-value storage scoped to one browser.
pub trait TokenStorage: Send + Sync {
    /// Read the value under `key`.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Delete the value under `key`. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// Saves, loads and clears the single session token.
pub struct CredentialStore<S> {
    storage: S,
    telemetry: SharedTelemetry,
}

impl<S: TokenStorage> CredentialStore<S> {
    /// Wrap a storage backend.
    pub fn new(storage: S, telemetry: SharedTelemetry) -> Self {
        Self { storage, telemetry }
    }

    /// Persist `token`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns the storage error after it has been reported to telemetry.
    /// The previous slot contents are unspecified on failure.
    pub async fn save(&self, token: &SessionToken) -> Result<(), StorageError> {
        self.storage
            .set(TOKEN_KEY, token.expose())
            .await
            .inspect_err(|e| self.report("save", e))
    }

    /// Read the stored token.
    ///
    /// Returns `None` when nothing is stored, when the stored value is empty,
    /// or when the read fails (the failure is reported).
    pub async fn load(&self) -> Option<SessionToken> {
        match self.storage.get(TOKEN_KEY).await {
            Ok(Some(token)) if !token.is_empty() => Some(SessionToken::new(token)),
            Ok(_) => None,
            Err(e) => {
                self.report("load", &e);
                None
            }
        }
    }

    /// Remove the stored token. Failures are reported and otherwise ignored.
    pub async fn clear(&self) {
        if let Err(e) = self.storage.remove(TOKEN_KEY).await {
            self.report("clear", &e);
        }
    }

    fn report(&self, operation: &'static str, error: &StorageError) {
        tracing::info!(operation, error = %error, "Credential storage failed");
        self.telemetry.capture(error);
    }
}
