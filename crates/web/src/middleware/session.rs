//! Session middleware configuration.
//!
//! Each browser gets a server-side session identified by a cookie. The
//! session is the persistent storage behind the credential store.
//!
//! Sessions live in a `moka` cache: entries expire with their record and the
//! cache never holds more than [`MAX_SESSIONS`], so sessions abandoned
//! without a logout are evicted.

use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_moka_store::MokaStore;

use crate::config::WebConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "orderdesk_session";

/// Upper bound on live sessions held in memory.
pub const MAX_SESSIONS: u64 = 10_000;

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the in-memory session store.
#[must_use]
pub fn create_session_store() -> MokaStore {
    MokaStore::new(Some(MAX_SESSIONS))
}

/// Create the session layer.
///
/// # Arguments
///
/// * `config` - Frontend configuration (for the `Secure` cookie flag)
#[must_use]
pub fn create_session_layer(config: &WebConfig) -> SessionManagerLayer<MokaStore> {
    SessionManagerLayer::new(create_session_store())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
