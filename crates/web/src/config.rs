//! Frontend configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `ORDERDESK_HOST` - Bind address (default: 127.0.0.1)
//! - `ORDERDESK_PORT` - Listen port (default: 3000)
//! - `ORDERDESK_BASE_URL` - Public URL of the frontend (default: <http://localhost:3000>)
//! - `ORDERDESK_GRAPHQL_URL` - Upstream GraphQL endpoint (default: <http://localhost:4000/graphql>)
//! - `ORDERDESK_ANONYMOUS_AUTH` - `literal` or `omit` (default: literal)
//! - `ORDERDESK_QUERY_CACHE_TTL_SECS` - Read-query cache TTL, 0 disables (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 1.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_GRAPHQL_URL: &str = "http://localhost:4000/graphql";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// What the gateway sends as `Authorization` when no session token exists.
///
/// The upstream contract for anonymous requests is unknown, so both
/// behaviours are available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnonymousAuthorization {
    /// Send the literal string `null`.
    #[default]
    Literal,
    /// Send no `Authorization` header at all.
    Omit,
}

impl FromStr for AnonymousAuthorization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "literal" => Ok(Self::Literal),
            "omit" => Ok(Self::Omit),
            other => Err(format!("expected 'literal' or 'omit', got '{other}'")),
        }
    }
}

/// Frontend application configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the frontend
    pub base_url: String,
    /// Upstream GraphQL API configuration
    pub graphql: GraphqlConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Fraction of transactions sent to Sentry
    pub sentry_traces_sample_rate: f32,
}

/// Upstream GraphQL API configuration.
#[derive(Debug, Clone)]
pub struct GraphqlConfig {
    /// GraphQL endpoint URL
    pub endpoint: Url,
    /// Header policy for requests made without a session token
    pub anonymous_authorization: AnonymousAuthorization,
    /// TTL for cached read queries; `None` disables caching
    pub cache_ttl: Option<Duration>,
}

impl WebConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("ORDERDESK_HOST", "127.0.0.1")?;
        let port = parse_env("ORDERDESK_PORT", "3000")?;
        let base_url = get_env_or_default("ORDERDESK_BASE_URL", "http://localhost:3000");
        let graphql = GraphqlConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_traces_sample_rate = parse_env("SENTRY_TRACES_SAMPLE_RATE", "1.0")?;

        Ok(Self {
            host,
            port,
            base_url,
            graphql,
            sentry_dsn,
            sentry_environment,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl GraphqlConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let endpoint = parse_env::<Url>("ORDERDESK_GRAPHQL_URL", DEFAULT_GRAPHQL_URL)?;
        let anonymous_authorization = parse_env("ORDERDESK_ANONYMOUS_AUTH", "literal")?;
        let ttl_secs: u64 = parse_env("ORDERDESK_QUERY_CACHE_TTL_SECS", "300")?;

        Ok(Self {
            endpoint,
            anonymous_authorization,
            cache_ttl: cache_ttl_from_secs(ttl_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Zero seconds means "do not cache".
const fn cache_ttl_from_secs(secs: u64) -> Option<Duration> {
    if secs == 0 {
        None
    } else {
        Some(Duration::from_secs(secs))
    }
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &get_env_or_default(key, default))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
