//! Session flow: login, signup, mount-time hydration and logout.
//!
//! # States
//!
//! ```text
//! Unauthenticated -> Authenticating -> Authenticated -> LoggingOut -> Unauthenticated
//!                          |
//!                          +--(failure)--> Unauthenticated
//! ```
//!
//! Failures on the login and signup forms are logged and reported but never
//! shown to the user; the form simply stays on screen.

use orderdesk_core::Route;

use crate::credentials::{CredentialStore, SessionToken, TokenStorage};
use crate::error::{add_breadcrumb, clear_sentry_user};
use crate::gateway::GraphqlApi;

/// Authentication state of one browser session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticating,
    Authenticated,
    LoggingOut,
}

/// What the page should do after a session operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
    /// Navigate to another page.
    Navigate(Route),
    /// Stay on the current page (the operation failed).
    Stay,
}

/// Drives the session state machine for one request.
pub struct SessionController<'a, A, S> {
    api: &'a A,
    credentials: CredentialStore<S>,
    state: SessionState,
    token: Option<SessionToken>,
}

impl<'a, A: GraphqlApi, S: TokenStorage> SessionController<'a, A, S> {
    /// Create a controller in the `Unauthenticated` state.
    pub fn new(api: &'a A, credentials: CredentialStore<S>) -> Self {
        Self {
            api,
            credentials,
            state: SessionState::Unauthenticated,
            token: None,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// The token held by this session, once authenticated.
    #[must_use]
    pub const fn token(&self) -> Option<&SessionToken> {
        self.token.as_ref()
    }

    /// Submit the login mutation.
    ///
    /// On success the returned token is written exactly once and the outcome
    /// is a navigation to the listing page. On any failure nothing is written
    /// and the caller stays on the login form.
    pub async fn login(&mut self, email: &str, password: &str) -> FlowOutcome {
        self.state = SessionState::Authenticating;
        add_breadcrumb("auth", "Login submitted", Some(&[("email", email)]));

        let token = match self.api.login(email, password).await {
            Ok(token) => token,
            Err(e) => {
                tracing::info!(error = %e, "Login failed");
                self.state = SessionState::Unauthenticated;
                return FlowOutcome::Stay;
            }
        };

        if let Err(e) = self.credentials.save(&token).await {
            tracing::info!(error = %e, "Login succeeded but the token could not be stored");
            self.state = SessionState::Unauthenticated;
            return FlowOutcome::Stay;
        }

        tracing::info!("Login successful, session token stored");
        self.token = Some(token);
        self.state = SessionState::Authenticated;
        FlowOutcome::Navigate(Route::Home)
    }

    /// Submit the signup mutation.
    ///
    /// Signing up does not authenticate; success leads to the login page.
    pub async fn signup(&mut self, name: &str, email: &str, password: &str) -> FlowOutcome {
        add_breadcrumb("auth", "Signup submitted", Some(&[("email", email)]));

        match self.api.create_user(name, email, password).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "Signup successful");
                FlowOutcome::Navigate(Route::Login)
            }
            Err(e) => {
                tracing::info!(error = %e, "Signup failed");
                FlowOutcome::Stay
            }
        }
    }

    /// Read the stored token when the listing page mounts.
    ///
    /// A missing or unreadable token leaves the session unauthenticated. No
    /// redirect is issued; the page keeps showing its loading state.
    pub async fn hydrate(&mut self) -> Option<&SessionToken> {
        self.token = self.credentials.load().await;
        self.state = if self.token.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        };
        self.token.as_ref()
    }

    /// Clear the stored token and go to the login page, whatever the prior state.
    pub async fn logout(&mut self) -> FlowOutcome {
        self.state = SessionState::LoggingOut;
        add_breadcrumb("auth", "Logout", None);

        self.credentials.clear().await;
        clear_sentry_user();

        self.token = None;
        self.state = SessionState::Unauthenticated;
        FlowOutcome::Navigate(Route::Login)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::credentials::testing::{CountingStorage, FailingStorage};
    use crate::credentials::{MemoryStorage, TOKEN_KEY};
    use crate::telemetry::RecordingTelemetry;
    use crate::testing::{Call, FakeApi};

    fn memory_controller(
        api: &FakeApi,
    ) -> (
        SessionController<'_, FakeApi, MemoryStorage>,
        MemoryStorage,
    ) {
        let storage = MemoryStorage::new();
        let credentials =
            CredentialStore::new(storage.clone(), Arc::new(RecordingTelemetry::new()));
        (SessionController::new(api, credentials), storage)
    }

    #[tokio::test]
    async fn test_login_success_stores_token_and_navigates_home() {
        let api = FakeApi::new().with_login_token("tok123");
        let (mut controller, storage) = memory_controller(&api);

        let outcome = controller.login("a@b.com", "x").await;

        assert_eq!(outcome, FlowOutcome::Navigate(Route::Home));
        assert_eq!(controller.state(), SessionState::Authenticated);
        assert_eq!(storage.peek(TOKEN_KEY).as_deref(), Some("tok123"));
        assert_eq!(
            api.calls(),
            vec![Call::Login {
                email: "a@b.com".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_login_failure_writes_nothing_and_stays() {
        let api = FakeApi::new();
        let (mut controller, storage) = memory_controller(&api);

        let outcome = controller.login("a@b.com", "wrong").await;

        assert_eq!(outcome, FlowOutcome::Stay);
        assert_eq!(controller.state(), SessionState::Unauthenticated);
        assert_eq!(storage.peek(TOKEN_KEY), None);
        assert_eq!(controller.token(), None);
    }

    #[tokio::test]
    async fn test_each_successful_login_writes_exactly_once() {
        let storage = CountingStorage::default();
        let failing = FakeApi::new();
        let credentials = CredentialStore::new(storage.clone(), Arc::new(RecordingTelemetry::new()));
        let mut controller = SessionController::new(&failing, credentials);
        controller.login("a@b.com", "x").await;
        assert_eq!(storage.writes(), 0);

        let succeeding = FakeApi::new().with_login_token("tok123");
        let credentials = CredentialStore::new(storage.clone(), Arc::new(RecordingTelemetry::new()));
        let mut controller = SessionController::new(&succeeding, credentials);
        controller.login("a@b.com", "x").await;
        assert_eq!(storage.writes(), 1);
        assert_eq!(storage.inner.peek(TOKEN_KEY).as_deref(), Some("tok123"));
    }

    #[tokio::test]
    async fn test_repeated_login_attempts() {
        let failing = FakeApi::new();
        let (mut controller, storage) = memory_controller(&failing);
        for _ in 0..3 {
            assert_eq!(controller.login("a@b.com", "x").await, FlowOutcome::Stay);
        }
        assert_eq!(storage.peek(TOKEN_KEY), None);

        let succeeding = FakeApi::new().with_login_token("tok");
        let (mut controller, storage) = memory_controller(&succeeding);
        for _ in 0..2 {
            assert_eq!(
                controller.login("a@b.com", "x").await,
                FlowOutcome::Navigate(Route::Home)
            );
        }
        assert_eq!(storage.peek(TOKEN_KEY).as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn test_login_with_unwritable_storage_stays() {
        let api = FakeApi::new().with_login_token("tok123");
        let telemetry = RecordingTelemetry::new();
        let credentials = CredentialStore::new(FailingStorage, Arc::new(telemetry.clone()));
        let mut controller = SessionController::new(&api, credentials);

        let outcome = controller.login("a@b.com", "x").await;

        assert_eq!(outcome, FlowOutcome::Stay);
        assert_eq!(controller.state(), SessionState::Unauthenticated);
        assert_eq!(telemetry.len(), 1);
    }

    #[tokio::test]
    async fn test_signup_success_navigates_to_login() {
        let api = FakeApi::new();
        let (mut controller, storage) = memory_controller(&api);

        let outcome = controller.signup("Ann", "ann@example.com", "pw").await;

        assert_eq!(outcome, FlowOutcome::Navigate(Route::Login));
        assert_eq!(controller.state(), SessionState::Unauthenticated);
        assert_eq!(storage.peek(TOKEN_KEY), None);
    }

    #[tokio::test]
    async fn test_signup_failure_stays() {
        let api = FakeApi::new().with_create_user_error("Email already taken");
        let (mut controller, _) = memory_controller(&api);

        assert_eq!(
            controller.signup("Ann", "ann@example.com", "pw").await,
            FlowOutcome::Stay
        );
    }

    #[tokio::test]
    async fn test_hydrate_with_token() {
        let api = FakeApi::new();
        let (mut controller, storage) = memory_controller(&api);
        storage.set(TOKEN_KEY, "tok123").await.expect("set");

        let token = controller.hydrate().await.cloned();

        assert_eq!(token, Some(SessionToken::new("tok123")));
        assert_eq!(controller.state(), SessionState::Authenticated);
    }

    #[tokio::test]
    async fn test_hydrate_without_token_stays_unauthenticated() {
        let api = FakeApi::new();
        let (mut controller, _) = memory_controller(&api);

        assert!(controller.hydrate().await.is_none());
        assert_eq!(controller.state(), SessionState::Unauthenticated);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_hydrate_with_unreadable_storage_stays_unauthenticated() {
        let api = FakeApi::new();
        let telemetry = RecordingTelemetry::new();
        let credentials = CredentialStore::new(FailingStorage, Arc::new(telemetry.clone()));
        let mut controller = SessionController::new(&api, credentials);

        assert!(controller.hydrate().await.is_none());
        assert_eq!(controller.state(), SessionState::Unauthenticated);
        assert_eq!(telemetry.len(), 1);
    }

    #[tokio::test]
    async fn test_logout_clears_token_from_any_state() {
        let api = FakeApi::new().with_login_token("tok123");

        // After a login.
        let (mut controller, storage) = memory_controller(&api);
        controller.login("a@b.com", "x").await;
        assert_eq!(
            controller.logout().await,
            FlowOutcome::Navigate(Route::Login)
        );
        assert_eq!(storage.peek(TOKEN_KEY), None);
        assert_eq!(controller.state(), SessionState::Unauthenticated);
        assert_eq!(controller.token(), None);

        // Without ever authenticating.
        let (mut controller, storage) = memory_controller(&api);
        assert_eq!(
            controller.logout().await,
            FlowOutcome::Navigate(Route::Login)
        );
        assert_eq!(storage.peek(TOKEN_KEY), None);
    }

    #[tokio::test]
    async fn test_logout_with_failing_storage_still_navigates() {
        let api = FakeApi::new();
        let telemetry = RecordingTelemetry::new();
        let credentials = CredentialStore::new(FailingStorage, Arc::new(telemetry.clone()));
        let mut controller = SessionController::new(&api, credentials);

        assert_eq!(
            controller.logout().await,
            FlowOutcome::Navigate(Route::Login)
        );
        assert_eq!(telemetry.len(), 1);
    }
}
