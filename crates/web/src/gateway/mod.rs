//! Authenticated GraphQL gateway.
//!
//! # Architecture
//!
//! - Uses `graphql-client` crate for type-safe GraphQL operations
//! - One explicitly constructed [`GraphqlGateway`] per process, shared through
//!   `AppState`; there is no global client
//! - Read queries are cached in memory via `moka`, scoped to the
//!   `Authorization` value they were made with
//! - Every error is forwarded to telemetry before it is returned; nothing is
//!   retried
//!
//! # Operations
//!
//! | Method | GraphQL |
//! |--------|---------|
//! | [`GraphqlApi::users`] | `query GetUsers` |
//! | [`GraphqlApi::orders`] | `query GetOrders($userId: ID!)` |
//! | [`GraphqlApi::login`] | `mutation Login($loginInput: LoginInput!)` |
//! | [`GraphqlApi::create_user`] | `mutation CreateUser($createUserInput: CreateUserInput!)` |

mod cache;
mod client;
mod conversions;
pub mod queries;
mod state;

use std::future::Future;

use orderdesk_core::{Order, User, UserId};
use thiserror::Error;

use crate::credentials::SessionToken;

pub use client::GraphqlGateway;
pub use state::QueryState;

/// Errors that can occur when talking to the GraphQL API.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        body: String,
    },

    /// GraphQL operation returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response had neither data nor errors.
    #[error("No data in response")]
    MissingData,
}

impl GatewayError {
    /// Message suitable for rendering after `Error: ` on a page.
    ///
    /// GraphQL errors show the server's messages only; everything else uses
    /// the full description.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::GraphQL(errors) if errors.iter().any(|e| !e.message.is_empty()) => errors
                .iter()
                .filter(|e| !e.message.is_empty())
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; "),
            other => other.to_string(),
        }
    }
}

/// A GraphQL error returned by the API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

/// Location in a GraphQL document where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut parts = Vec::new();

            if !e.message.is_empty() {
                parts.push(e.message.clone());
            }

            if !e.path.is_empty() {
                let path_str = e
                    .path
                    .iter()
                    .map(|p| match p {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                parts.push(format!("path: {path_str}"));
            }

            if let Some(loc) = e.locations.first() {
                parts.push(format!("at line {}:{}", loc.line, loc.column));
            }

            if parts.is_empty() {
                format!("[error {}]: (no details)", i + 1)
            } else {
                parts.join(" ")
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// The operations the frontend performs against the GraphQL API.
///
/// [`GraphqlGateway`] is the production implementation; the session
/// controller and selection sequencer only depend on this trait.
pub trait GraphqlApi: Send + Sync {
    /// List all users (primary query).
    fn users(
        &self,
        token: Option<&SessionToken>,
    ) -> impl Future<Output = Result<Vec<User>, GatewayError>> + Send;

    /// List the orders of one user (secondary query).
    fn orders(
        &self,
        user_id: UserId,
        token: Option<&SessionToken>,
    ) -> impl Future<Output = Result<Vec<Order>, GatewayError>> + Send;

    /// Exchange credentials for a session token.
    fn login(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<SessionToken, GatewayError>> + Send;

    /// Register a new user.
    fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<User, GatewayError>> + Send;
}
