//! Integration test harness for Orderdesk.
//!
//! Each test starts two in-process servers on ephemeral ports:
//!
//! - a scripted fake GraphQL API that records every request it receives
//! - the real frontend router, configured to talk to the fake API
//!
//! and drives the frontend with a cookie-keeping `reqwest` client, the same
//! way a browser would.
//!
//! # Example
//!
//! ```rust,ignore
//! let ctx = TestContext::start(
//!     FakeGraphql::new().respond("Login", json!({ "data": { "login": "tok123" } })),
//! )
//! .await;
//! let resp = ctx.post_form("/login", &[("email", "a@b.com"), ("password", "x")]).await;
//! ```

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, header::AUTHORIZATION},
    routing::post,
};
use orderdesk_web::config::{AnonymousAuthorization, GraphqlConfig, WebConfig};
use orderdesk_web::state::AppState;
use orderdesk_web::telemetry::RecordingTelemetry;
use reqwest::{Client, Response, redirect};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use url::Url;

/// One request received by the fake GraphQL API.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// The `operationName` from the request body.
    pub operation: Option<String>,
    /// The raw `Authorization` header, if one was sent.
    pub authorization: Option<String>,
    /// The `variables` object from the request body.
    pub variables: Value,
}

/// Scripted GraphQL API.
///
/// Responses are keyed by operation name. One-shot responses queued with
/// [`FakeGraphql::respond_once`] are served first, in order. Unscripted
/// operations answer with a GraphQL error.
#[derive(Clone, Default)]
pub struct FakeGraphql {
    responses: Arc<HashMap<String, Value>>,
    queued: Arc<Mutex<HashMap<String, VecDeque<Value>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeGraphql {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `operation` with `body` (a full GraphQL response document).
    #[must_use]
    pub fn respond(mut self, operation: &str, body: Value) -> Self {
        Arc::make_mut(&mut self.responses).insert(operation.to_string(), body);
        self
    }

    /// Answer the next unanswered `operation` with `body`, once.
    #[must_use]
    pub fn respond_once(self, operation: &str, body: Value) -> Self {
        self.queued
            .lock()
            .expect("queued lock")
            .entry(operation.to_string())
            .or_default()
            .push_back(body);
        self
    }

    /// Answer `operation` with a single GraphQL error.
    #[must_use]
    pub fn respond_error(self, operation: &str, message: &str) -> Self {
        self.respond(
            operation,
            json!({ "data": null, "errors": [{ "message": message }] }),
        )
    }

    /// All requests received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    /// Requests for one operation.
    #[must_use]
    pub fn requests_for(&self, operation: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.operation.as_deref() == Some(operation))
            .collect()
    }

    async fn start(self) -> SocketAddr {
        let app = Router::new()
            .route("/graphql", post(graphql))
            .with_state(self);
        spawn(app).await
    }
}

async fn graphql(
    State(fake): State<FakeGraphql>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let operation = body
        .get("operationName")
        .and_then(Value::as_str)
        .map(String::from);
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    fake.requests
        .lock()
        .expect("requests lock")
        .push(RecordedRequest {
            operation: operation.clone(),
            authorization,
            variables: body.get("variables").cloned().unwrap_or(Value::Null),
        });

    let queued = operation.as_ref().and_then(|name| {
        fake.queued
            .lock()
            .expect("queued lock")
            .get_mut(name)
            .and_then(VecDeque::pop_front)
    });
    let response = queued
        .or_else(|| operation.and_then(|name| fake.responses.get(&name).cloned()))
        .unwrap_or_else(|| json!({ "data": null, "errors": [{ "message": "unscripted operation" }] }));
    Json(response)
}

async fn spawn(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });
    addr
}

/// A running frontend wired to a fake GraphQL API.
pub struct TestContext {
    pub api: FakeGraphql,
    pub telemetry: RecordingTelemetry,
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    /// Start the fake API and a frontend pointed at it.
    pub async fn start(api: FakeGraphql) -> Self {
        let api_addr = api.clone().start().await;

        let config = WebConfig {
            host: "127.0.0.1".parse().expect("valid ip"),
            port: 0,
            base_url: "http://127.0.0.1".to_string(),
            graphql: GraphqlConfig {
                endpoint: Url::parse(&format!("http://{api_addr}/graphql")).expect("valid url"),
                anonymous_authorization: AnonymousAuthorization::default(),
                cache_ttl: None,
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_traces_sample_rate: 0.0,
        };

        let telemetry = RecordingTelemetry::new();
        let state = AppState::new(config, Arc::new(telemetry.clone()));
        let addr = spawn(orderdesk_web::app(state)).await;

        let client = Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api,
            telemetry,
            client,
            base_url: format!("http://{addr}"),
        }
    }

    /// GET a frontend path.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .expect("GET failed")
    }

    /// POST a form to a frontend path.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(format!("{}{path}", self.base_url))
            .form(form)
            .send()
            .await
            .expect("POST failed")
    }

    /// Log in with a scripted token and return the redirect response.
    pub async fn login(&self) -> Response {
        self.post_form("/login", &[("email", "a@b.com"), ("password", "x")])
            .await
    }
}

/// The `Location` header of a redirect response.
#[must_use]
pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

/// A `Login` response carrying `token`.
#[must_use]
pub fn login_response(token: &str) -> Value {
    json!({ "data": { "login": token } })
}

/// A `GetUsers` response with the given `(id, name)` pairs.
#[must_use]
pub fn users_response(users: &[(i64, &str)]) -> Value {
    let users: Vec<Value> = users
        .iter()
        .map(|(id, name)| {
            json!({
                "id": id,
                "name": name,
                "email": format!("{}@example.com", name.to_lowercase()),
            })
        })
        .collect();
    json!({ "data": { "users": users } })
}

/// A `GetOrders` response with one order per `(id, total_price)` pair.
#[must_use]
pub fn orders_response(user_id: i64, orders: &[(&str, f64)]) -> Value {
    let orders: Vec<Value> = orders
        .iter()
        .map(|(id, total)| {
            json!({
                "id": id,
                "user_id": user_id,
                "product_id": "prod-1",
                "quantity": 2,
                "total_price": total,
            })
        })
        .collect();
    json!({ "data": { "getOrders": orders } })
}
