//! GraphQL gateway client implementation.
//!
//! Uses `graphql_client` for type-safe operations with `reqwest` 0.13 for
//! HTTP. Read queries are cached using `moka`.

use std::sync::Arc;

use graphql_client::{GraphQLQuery, QueryBody, Response};
use moka::future::Cache;
use orderdesk_core::{Order, User, UserId};
use reqwest::header::AUTHORIZATION;
use tracing::{debug, instrument};
use url::Url;

use super::cache::{CacheKey, CacheValue};
use super::conversions::{convert_created_user, convert_order, convert_user};
use super::queries::{
    CreateUser, GetOrders, GetUsers, Login, create_user, get_orders, get_users, login,
};
use super::{GatewayError, GraphQLError, GraphQLErrorLocation, GraphqlApi};
use crate::config::{AnonymousAuthorization, GraphqlConfig};
use crate::credentials::SessionToken;
use crate::telemetry::SharedTelemetry;

/// Header value sent for a missing token under [`AnonymousAuthorization::Literal`].
const ANONYMOUS_AUTHORIZATION_LITERAL: &str = "null";

const MAX_CACHE_ENTRIES: u64 = 1000;

/// How a single operation authenticates.
#[derive(Debug, Clone, Copy)]
enum Authorization<'a> {
    /// No `Authorization` header (login and signup mutations).
    None,
    /// The page's session token, which may be absent.
    Session(Option<&'a SessionToken>),
}

// =============================================================================
// GraphqlGateway
// =============================================================================

/// Client for the upstream GraphQL API.
///
/// Cheap to clone; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct GraphqlGateway {
    inner: Arc<GraphqlGatewayInner>,
}

struct GraphqlGatewayInner {
    client: reqwest::Client,
    endpoint: Url,
    anonymous_authorization: AnonymousAuthorization,
    cache: Option<Cache<CacheKey, CacheValue>>,
    telemetry: SharedTelemetry,
}

impl GraphqlGateway {
    /// Create a new gateway.
    #[must_use]
    pub fn new(config: &GraphqlConfig, telemetry: SharedTelemetry) -> Self {
        let cache = config.cache_ttl.map(|ttl| {
            Cache::builder()
                .max_capacity(MAX_CACHE_ENTRIES)
                .time_to_live(ttl)
                .build()
        });

        Self {
            inner: Arc::new(GraphqlGatewayInner {
                client: reqwest::Client::new(),
                endpoint: config.endpoint.clone(),
                anonymous_authorization: config.anonymous_authorization,
                cache,
                telemetry,
            }),
        }
    }

    /// The `Authorization` header value for an operation, if any.
    fn authorization_header(&self, auth: Authorization<'_>) -> Option<String> {
        match auth {
            Authorization::None => None,
            Authorization::Session(Some(token)) => Some(token.expose().to_string()),
            Authorization::Session(None) => match self.inner.anonymous_authorization {
                AnonymousAuthorization::Literal => {
                    Some(ANONYMOUS_AUTHORIZATION_LITERAL.to_string())
                }
                AnonymousAuthorization::Omit => None,
            },
        }
    }

    /// Execute a GraphQL operation, reporting any failure to telemetry.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
        authorization: Option<&str>,
    ) -> Result<Q::ResponseData, GatewayError>
    where
        Q::Variables: serde::Serialize,
    {
        let request_body = Q::build_query(variables);
        let result = self.send::<Q>(&request_body, authorization).await;

        if let Err(e) = &result {
            tracing::info!(
                operation = request_body.operation_name,
                error = %e,
                "GraphQL operation failed"
            );
            self.inner.telemetry.capture(e);
        }

        result
    }

    async fn send<Q: GraphQLQuery>(
        &self,
        request_body: &QueryBody<Q::Variables>,
        authorization: Option<&str>,
    ) -> Result<Q::ResponseData, GatewayError>
    where
        Q::Variables: serde::Serialize,
    {
        let mut request = self
            .inner
            .client
            .post(self.inner.endpoint.clone())
            .header("Content-Type", "application/json")
            .json(request_body);

        if let Some(value) = authorization {
            request = request.header(AUTHORIZATION, value);
        }

        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::debug!(
                status = %status,
                body = %truncate(&response_text, 500),
                "GraphQL API returned non-success status"
            );
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: truncate(&response_text, 200),
            });
        }

        let response: Response<Q::ResponseData> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(
                    error = %e,
                    body = %truncate(&response_text, 500),
                    "Failed to parse GraphQL response"
                );
                return Err(GatewayError::Parse(e));
            }
        };

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            tracing::debug!(errors = ?errors, "GraphQL errors in response");
            return Err(GatewayError::GraphQL(
                errors.into_iter().map(convert_graphql_error).collect(),
            ));
        }

        response.data.ok_or(GatewayError::MissingData)
    }

    async fn cached(&self, key: &CacheKey) -> Option<CacheValue> {
        match &self.inner.cache {
            Some(cache) => cache.get(key).await,
            None => None,
        }
    }

    async fn remember(&self, key: CacheKey, value: CacheValue) {
        if let Some(cache) = &self.inner.cache {
            cache.insert(key, value).await;
        }
    }
}

impl GraphqlApi for GraphqlGateway {
    #[instrument(skip_all)]
    async fn users(&self, token: Option<&SessionToken>) -> Result<Vec<User>, GatewayError> {
        let authorization = self.authorization_header(Authorization::Session(token));
        let cache_key = CacheKey::Users {
            authorization: authorization.clone(),
        };

        if let Some(CacheValue::Users(users)) = self.cached(&cache_key).await {
            debug!("Cache hit for users");
            return Ok(users);
        }

        let data = self
            .execute::<GetUsers>(get_users::Variables, authorization.as_deref())
            .await?;

        let users: Vec<User> = data.users.into_iter().map(convert_user).collect();
        self.remember(cache_key, CacheValue::Users(users.clone()))
            .await;

        Ok(users)
    }

    #[instrument(skip_all, fields(user_id = %user_id))]
    async fn orders(
        &self,
        user_id: UserId,
        token: Option<&SessionToken>,
    ) -> Result<Vec<Order>, GatewayError> {
        let authorization = self.authorization_header(Authorization::Session(token));
        let cache_key = CacheKey::Orders {
            user_id,
            authorization: authorization.clone(),
        };

        if let Some(CacheValue::Orders(orders)) = self.cached(&cache_key).await {
            debug!("Cache hit for orders");
            return Ok(orders);
        }

        let variables = get_orders::Variables {
            user_id: user_id.to_string(),
        };
        let data = self
            .execute::<GetOrders>(variables, authorization.as_deref())
            .await?;

        let orders: Vec<Order> = data.get_orders.into_iter().map(convert_order).collect();
        self.remember(cache_key, CacheValue::Orders(orders.clone()))
            .await;

        Ok(orders)
    }

    #[instrument(skip_all, fields(email = %email))]
    async fn login(&self, email: &str, password: &str) -> Result<SessionToken, GatewayError> {
        let variables = login::Variables {
            login_input: login::LoginInput {
                email: email.to_string(),
                password: password.to_string(),
            },
        };
        let authorization = self.authorization_header(Authorization::None);
        let data = self
            .execute::<Login>(variables, authorization.as_deref())
            .await?;

        Ok(SessionToken::new(data.login))
    }

    #[instrument(skip_all, fields(email = %email))]
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, GatewayError> {
        let variables = create_user::Variables {
            create_user_input: create_user::CreateUserInput {
                name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            },
        };
        let authorization = self.authorization_header(Authorization::None);
        let data = self
            .execute::<CreateUser>(variables, authorization.as_deref())
            .await?;

        Ok(convert_created_user(data.create_user))
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn convert_graphql_error(error: graphql_client::Error) -> GraphQLError {
    GraphQLError {
        message: error.message,
        locations: error.locations.map_or_else(Vec::new, |locs| {
            locs.into_iter()
                .map(|l| GraphQLErrorLocation {
                    line: i64::from(l.line),
                    column: i64::from(l.column),
                })
                .collect()
        }),
        path: error.path.map_or_else(Vec::new, |p| {
            p.into_iter()
                .map(|fragment| match fragment {
                    graphql_client::PathFragment::Key(s) => serde_json::Value::String(s),
                    graphql_client::PathFragment::Index(i) => serde_json::Value::Number(i.into()),
                })
                .collect()
        }),
    }
}
