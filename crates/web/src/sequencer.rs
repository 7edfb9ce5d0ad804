//! Selection-gated query sequencing for the listing page.
//!
//! The primary query (all users) runs as soon as the page is authenticated.
//! The secondary query (orders of one user) runs only once a user has been
//! selected, and is issued again each time the selection changes. While
//! nothing is selected the secondary query does not exist at all.
//!
//! In-flight queries are never cancelled. Each secondary issue carries a
//! tag; a response whose tag is no longer the latest is discarded, so a slow
//! answer for an abandoned selection cannot overwrite the current one. The
//! tag guards selects that overlap on one sequencer; each page render builds
//! its own sequencer.

use std::sync::{Mutex, MutexGuard, PoisonError};

use orderdesk_core::{Order, User, UserId};

use crate::credentials::SessionToken;
use crate::error::add_breadcrumb;
use crate::gateway::{GraphqlApi, QueryState};

/// Identifies one issue of the secondary query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IssueTag {
    sequence: u64,
    user_id: UserId,
}

/// Result of a [`SelectionSequencer::select`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The selection did not change; nothing was issued.
    Unchanged,
    /// The query was issued and its response is now the orders state.
    Applied,
    /// The query was issued but the selection moved on before it resolved.
    Discarded,
}

/// Everything the listing page renders, captured at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingSnapshot {
    pub users: QueryState<Vec<User>>,
    pub selection: Option<UserId>,
    /// `None` exactly when `selection` is `None`.
    pub orders: Option<QueryState<Vec<Order>>>,
}

#[derive(Debug)]
struct SequencerState {
    users: QueryState<Vec<User>>,
    selection: Option<UserId>,
    orders: Option<QueryState<Vec<Order>>>,
    latest: Option<IssueTag>,
    issued: u64,
    discarded: u64,
}

/// Drives the primary and secondary queries of one listing page.
pub struct SelectionSequencer<'a, A> {
    api: &'a A,
    token: Option<SessionToken>,
    state: Mutex<SequencerState>,
}

impl<'a, A: GraphqlApi> SelectionSequencer<'a, A> {
    /// Create a sequencer with nothing selected and the primary query pending.
    pub fn new(api: &'a A, token: Option<SessionToken>) -> Self {
        Self {
            api,
            token,
            state: Mutex::new(SequencerState {
                users: QueryState::Loading,
                selection: None,
                orders: None,
                latest: None,
                issued: 0,
                discarded: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SequencerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run the primary query.
    pub async fn load_users(&self) {
        self.lock().users = QueryState::Loading;
        let result = self.api.users(self.token.as_ref()).await;
        self.lock().users = result.into();
    }

    /// Select a user, issuing the secondary query if the selection changed.
    ///
    /// Exactly one query is issued per change. Selecting the user that is
    /// already selected issues nothing.
    pub async fn select(&self, user_id: UserId) -> SelectOutcome {
        let tag = {
            let mut state = self.lock();
            if state.selection == Some(user_id) {
                return SelectOutcome::Unchanged;
            }
            state.issued += 1;
            let tag = IssueTag {
                sequence: state.issued,
                user_id,
            };
            state.selection = Some(user_id);
            state.orders = Some(QueryState::Loading);
            state.latest = Some(tag);
            tag
        };

        let user_id_str = user_id.to_string();
        add_breadcrumb("orders", "User selected", Some(&[("user_id", user_id_str.as_str())]));

        let result = self.api.orders(user_id, self.token.as_ref()).await;

        let mut state = self.lock();
        if state.latest == Some(tag) {
            state.orders = Some(result.into());
            SelectOutcome::Applied
        } else {
            state.discarded += 1;
            tracing::debug!(
                user_id = %tag.user_id,
                sequence = tag.sequence,
                current = ?state.selection,
                "Discarding stale orders response"
            );
            SelectOutcome::Discarded
        }
    }

    /// Drop the selection. Any in-flight secondary response is discarded.
    #[cfg(test)]
    pub(crate) fn clear_selection(&self) {
        let mut state = self.lock();
        state.selection = None;
        state.orders = None;
        state.latest = None;
    }

    /// Whether the user list has loaded and contains `user_id`.
    #[must_use]
    pub fn is_listed(&self, user_id: UserId) -> bool {
        self.lock()
            .users
            .data()
            .is_some_and(|users| users.iter().any(|user| user.id == user_id))
    }

    /// The current selection.
    #[must_use]
    pub fn selection(&self) -> Option<UserId> {
        self.lock().selection
    }

    /// State of the primary query.
    #[must_use]
    pub fn users(&self) -> QueryState<Vec<User>> {
        self.lock().users.clone()
    }

    /// State of the secondary query; `None` while nothing is selected.
    #[must_use]
    pub fn orders(&self) -> Option<QueryState<Vec<Order>>> {
        self.lock().orders.clone()
    }

    /// How many times the secondary query has been issued.
    #[must_use]
    pub fn issued_order_queries(&self) -> u64 {
        self.lock().issued
    }

    /// How many secondary responses arrived too late and were dropped.
    #[must_use]
    pub fn discarded_responses(&self) -> u64 {
        self.lock().discarded
    }

    /// Capture the renderable state.
    #[must_use]
    pub fn snapshot(&self) -> ListingSnapshot {
        let state = self.lock();
        ListingSnapshot {
            users: state.users.clone(),
            selection: state.selection,
            orders: state.orders.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, FakeApi, order, user};

    fn token() -> Option<SessionToken> {
        Some(SessionToken::new("tok123"))
    }

    #[tokio::test]
    async fn test_primary_query_without_selection() {
        let api = FakeApi::new().with_users(vec![user(5, "Ann"), user(7, "Bob")]);
        let sequencer = SelectionSequencer::new(&api, token());

        assert!(sequencer.users().is_loading());
        sequencer.load_users().await;

        assert_eq!(sequencer.users().data().map(Vec::len), Some(2));
        assert_eq!(sequencer.selection(), None);
        assert_eq!(sequencer.orders(), None);
        assert!(api.order_calls().is_empty());
    }

    #[tokio::test]
    async fn test_only_listed_users_can_be_selected() {
        let api = FakeApi::new().with_users(vec![user(5, "Ann")]);
        let sequencer = SelectionSequencer::new(&api, token());
        assert!(!sequencer.is_listed(UserId::new(5)));

        sequencer.load_users().await;

        assert!(sequencer.is_listed(UserId::new(5)));
        assert!(!sequencer.is_listed(UserId::new(7)));
    }

    #[tokio::test]
    async fn test_failed_primary_lists_nobody() {
        let api = FakeApi::new().with_users_error("Network down");
        let sequencer = SelectionSequencer::new(&api, token());

        sequencer.load_users().await;

        assert!(!sequencer.is_listed(UserId::new(5)));
    }

    #[tokio::test]
    async fn test_primary_query_carries_token() {
        let api = FakeApi::new();
        let sequencer = SelectionSequencer::new(&api, token());

        sequencer.load_users().await;

        assert_eq!(
            api.calls(),
            vec![Call::Users {
                token: Some("tok123".to_string())
            }]
        );
    }

    #[tokio::test]
    async fn test_primary_query_error_is_rendered_message() {
        let api = FakeApi::new().with_users_error("Network down");
        let sequencer = SelectionSequencer::new(&api, token());

        sequencer.load_users().await;

        assert_eq!(sequencer.users().error(), Some("Network down"));
        assert!(api.order_calls().is_empty());
    }

    #[tokio::test]
    async fn test_selection_issues_one_query_per_change() {
        let api = FakeApi::new()
            .with_orders(5, vec![order("o-1", 5, 10.0)])
            .with_orders(7, vec![order("o-2", 7, 20.5), order("o-3", 7, 1.0)]);
        let sequencer = SelectionSequencer::new(&api, token());

        assert_eq!(sequencer.select(UserId::new(5)).await, SelectOutcome::Applied);
        assert_eq!(api.order_calls(), vec![UserId::new(5)]);
        assert_eq!(
            sequencer.orders().and_then(|o| o.data().map(Vec::len)),
            Some(1)
        );

        assert_eq!(sequencer.select(UserId::new(7)).await, SelectOutcome::Applied);
        assert_eq!(api.order_calls(), vec![UserId::new(5), UserId::new(7)]);
        assert_eq!(
            sequencer.orders().and_then(|o| o.data().map(Vec::len)),
            Some(2)
        );
        assert_eq!(sequencer.issued_order_queries(), 2);
    }

    #[tokio::test]
    async fn test_reselecting_same_user_issues_nothing() {
        let api = FakeApi::new();
        let sequencer = SelectionSequencer::new(&api, token());

        sequencer.select(UserId::new(5)).await;
        assert_eq!(
            sequencer.select(UserId::new(5)).await,
            SelectOutcome::Unchanged
        );

        assert_eq!(api.order_calls(), vec![UserId::new(5)]);
    }

    #[tokio::test]
    async fn test_order_query_carries_selected_user_and_token() {
        let api = FakeApi::new();
        let sequencer = SelectionSequencer::new(&api, token());

        sequencer.select(UserId::new(5)).await;

        assert_eq!(
            api.calls(),
            vec![Call::Orders {
                user_id: UserId::new(5),
                token: Some("tok123".to_string())
            }]
        );
    }

    #[tokio::test]
    async fn test_stale_response_does_not_overwrite_current_selection() {
        let api = FakeApi::new()
            .with_orders(5, vec![order("stale", 5, 1.0)])
            .with_orders(7, vec![order("fresh", 7, 2.0)]);
        let release_five = api.gate_orders(5);
        let sequencer = SelectionSequencer::new(&api, token());

        let (first, second) = tokio::join!(sequencer.select(UserId::new(5)), async {
            let outcome = sequencer.select(UserId::new(7)).await;
            // The response for user 5 resolves only after user 7 is applied.
            let _ = release_five.send(());
            outcome
        });

        assert_eq!(second, SelectOutcome::Applied);
        assert_eq!(first, SelectOutcome::Discarded);
        assert_eq!(sequencer.selection(), Some(UserId::new(7)));
        let orders = sequencer.orders().and_then(|o| o.data().cloned());
        assert_eq!(orders, Some(vec![order("fresh", 7, 2.0)]));
        assert_eq!(sequencer.discarded_responses(), 1);
        assert_eq!(api.order_calls(), vec![UserId::new(5), UserId::new(7)]);
    }

    #[tokio::test]
    async fn test_orders_exist_iff_selection_exists() {
        let api = FakeApi::new();
        let sequencer = SelectionSequencer::new(&api, token());

        let snapshot = sequencer.snapshot();
        assert_eq!(snapshot.selection, None);
        assert_eq!(snapshot.orders, None);

        sequencer.select(UserId::new(5)).await;
        let snapshot = sequencer.snapshot();
        assert_eq!(snapshot.selection, Some(UserId::new(5)));
        assert!(snapshot.orders.is_some());

        sequencer.clear_selection();
        let snapshot = sequencer.snapshot();
        assert_eq!(snapshot.selection, None);
        assert_eq!(snapshot.orders, None);
    }

    #[tokio::test]
    async fn test_response_after_clear_is_discarded() {
        let api = FakeApi::new().with_orders(5, vec![order("o-1", 5, 1.0)]);
        let release = api.gate_orders(5);
        let sequencer = SelectionSequencer::new(&api, token());

        let (outcome, ()) = tokio::join!(sequencer.select(UserId::new(5)), async {
            sequencer.clear_selection();
            let _ = release.send(());
        });

        assert_eq!(outcome, SelectOutcome::Discarded);
        assert_eq!(sequencer.orders(), None);
    }

    #[tokio::test]
    async fn test_primary_and_secondary_are_independent() {
        let api = FakeApi::new()
            .with_users_error("users unavailable")
            .with_orders(5, vec![order("o-1", 5, 3.0)]);
        let sequencer = SelectionSequencer::new(&api, token());

        let ((), outcome) = tokio::join!(sequencer.load_users(), sequencer.select(UserId::new(5)));

        assert_eq!(outcome, SelectOutcome::Applied);
        assert_eq!(sequencer.users().error(), Some("users unavailable"));
        assert!(sequencer.orders().and_then(|o| o.data().cloned()).is_some());
    }
}
