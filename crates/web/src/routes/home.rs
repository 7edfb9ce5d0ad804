//! Listing page: every user, plus the orders of the selected one.
//!
//! The page hydrates the stored token first. Without a token no query is
//! issued and the page stays on its loading state; there is no redirect.
//! The orders query runs only after the user list has loaded and contains
//! the selected user.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use orderdesk_core::{Order, User, UserId};
use serde::Deserialize;
use tower_sessions::Session;

use crate::gateway::QueryState;
use crate::sequencer::{ListingSnapshot, SelectionSequencer};
use crate::state::AppState;

/// Query parameters for the listing page.
#[derive(Debug, Deserialize)]
pub struct HomeQuery {
    /// The selected user, if any.
    pub user: Option<UserId>,
}

/// Shown while the user list is pending or no token is stored.
#[derive(Template, WebTemplate)]
#[template(path = "loading.html")]
pub struct LoadingTemplate;

/// Shown when the user list failed; replaces the whole page.
#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub message: String,
}

/// The listing itself.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub users: Vec<User>,
    pub orders: Option<OrdersSection>,
}

/// Orders panel for the selected user.
#[derive(Debug, Clone)]
pub struct OrdersSection {
    pub user_id: UserId,
    pub loading: bool,
    pub error: Option<String>,
    pub orders: Vec<Order>,
}

impl OrdersSection {
    fn new(user_id: UserId, state: QueryState<Vec<Order>>) -> Self {
        match state {
            QueryState::Loading => Self {
                user_id,
                loading: true,
                error: None,
                orders: Vec::new(),
            },
            QueryState::Failed(message) => Self {
                user_id,
                loading: false,
                error: Some(message),
                orders: Vec::new(),
            },
            QueryState::Ready(orders) => Self {
                user_id,
                loading: false,
                error: None,
                orders,
            },
        }
    }
}

/// Display the listing page.
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<HomeQuery>,
) -> Response {
    let mut controller = state.session_controller(session);
    let Some(token) = controller.hydrate().await.cloned() else {
        tracing::debug!("No stored token, listing stays in loading state");
        return LoadingTemplate.into_response();
    };

    let sequencer = SelectionSequencer::new(state.gateway(), Some(token));
    sequencer.load_users().await;

    // A user can only be selected from a rendered row.
    if let Some(user_id) = query.user {
        if sequencer.is_listed(user_id) {
            sequencer.select(user_id).await;
        } else {
            tracing::debug!(user_id = %user_id, "Selected user is not listed, skipping orders");
        }
    }

    tracing::debug!(
        issued = sequencer.issued_order_queries(),
        discarded = sequencer.discarded_responses(),
        "Listing queries settled"
    );

    render(sequencer.snapshot())
}

fn render(snapshot: ListingSnapshot) -> Response {
    match snapshot.users {
        QueryState::Loading => LoadingTemplate.into_response(),
        QueryState::Failed(message) => ErrorTemplate { message }.into_response(),
        QueryState::Ready(users) => {
            let orders = snapshot
                .selection
                .zip(snapshot.orders)
                .map(|(user_id, state)| OrdersSection::new(user_id, state));
            HomeTemplate { users, orders }.into_response()
        }
    }
}
