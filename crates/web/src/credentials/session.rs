//! Token storage backed by the per-browser server session.
//!
//! The session cookie identifies the browser; the token itself never leaves
//! the server.

use tower_sessions::Session;

use super::{StorageError, TokenStorage};

impl TokenStorage for Session {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(Session::get::<String>(self, key).await?)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Ok(self.insert(key, value).await?)
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        Session::remove::<String>(self, key).await?;
        Ok(())
    }
}
