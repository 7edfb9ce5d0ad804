//! Test doubles shared by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use orderdesk_core::{Order, OrderId, ProductId, User, UserId};
use tokio::sync::oneshot;

use crate::credentials::SessionToken;
use crate::gateway::{GatewayError, GraphQLError, GraphqlApi};

/// One recorded call against [`FakeApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Users { token: Option<String> },
    Orders { user_id: UserId, token: Option<String> },
    Login { email: String },
    CreateUser { email: String },
}

/// Scriptable in-memory GraphQL API.
#[derive(Default)]
pub struct FakeApi {
    users: Vec<User>,
    users_error: Option<String>,
    orders: HashMap<UserId, Vec<Order>>,
    login_token: Option<String>,
    create_user_error: Option<String>,
    gates: Mutex<HashMap<UserId, oneshot::Receiver<()>>>,
    calls: Mutex<Vec<Call>>,
}

pub fn graphql_error(message: &str) -> GatewayError {
    GatewayError::GraphQL(vec![GraphQLError {
        message: message.to_string(),
        locations: vec![],
        path: vec![],
    }])
}

pub fn user(id: i64, name: &str) -> User {
    User {
        id: UserId::new(id),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
    }
}

pub fn order(id: &str, user_id: i64, total_price: f64) -> Order {
    Order {
        id: OrderId::new(id),
        user_id: UserId::new(user_id),
        product_id: ProductId::new("prod-1"),
        quantity: 1,
        total_price,
    }
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(mut self, users: Vec<User>) -> Self {
        self.users = users;
        self
    }

    pub fn with_users_error(mut self, message: &str) -> Self {
        self.users_error = Some(message.to_string());
        self
    }

    pub fn with_orders(mut self, user_id: i64, orders: Vec<Order>) -> Self {
        self.orders.insert(UserId::new(user_id), orders);
        self
    }

    pub fn with_login_token(mut self, token: &str) -> Self {
        self.login_token = Some(token.to_string());
        self
    }

    pub fn with_create_user_error(mut self, message: &str) -> Self {
        self.create_user_error = Some(message.to_string());
        self
    }

    /// Hold the next `orders(user_id)` response until the returned sender fires.
    pub fn gate_orders(&self, user_id: i64) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates
            .lock()
            .expect("gates lock")
            .insert(UserId::new(user_id), rx);
        tx
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn order_calls(&self) -> Vec<UserId> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Orders { user_id, .. } => Some(user_id),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

impl GraphqlApi for FakeApi {
    async fn users(&self, token: Option<&SessionToken>) -> Result<Vec<User>, GatewayError> {
        self.record(Call::Users {
            token: token.map(|t| t.expose().to_string()),
        });
        match &self.users_error {
            Some(message) => Err(graphql_error(message)),
            None => Ok(self.users.clone()),
        }
    }

    async fn orders(
        &self,
        user_id: UserId,
        token: Option<&SessionToken>,
    ) -> Result<Vec<Order>, GatewayError> {
        self.record(Call::Orders {
            user_id,
            token: token.map(|t| t.expose().to_string()),
        });
        let gate = self.gates.lock().expect("gates lock").remove(&user_id);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        Ok(self.orders.get(&user_id).cloned().unwrap_or_default())
    }

    async fn login(&self, email: &str, _password: &str) -> Result<SessionToken, GatewayError> {
        self.record(Call::Login {
            email: email.to_string(),
        });
        self.login_token
            .as_deref()
            .map(SessionToken::new)
            .ok_or_else(|| graphql_error("Invalid credentials"))
    }

    async fn create_user(
        &self,
        name: &str,
        email: &str,
        _password: &str,
    ) -> Result<User, GatewayError> {
        self.record(Call::CreateUser {
            email: email.to_string(),
        });
        match &self.create_user_error {
            Some(message) => Err(graphql_error(message)),
            None => Ok(User {
                id: UserId::new(1),
                name: name.to_string(),
                email: email.to_string(),
            }),
        }
    }
}
