//! Application state shared across handlers.

use std::sync::Arc;

use tower_sessions::Session;

use crate::config::WebConfig;
use crate::credentials::CredentialStore;
use crate::gateway::GraphqlGateway;
use crate::session::SessionController;
use crate::telemetry::SharedTelemetry;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and owns the single GraphQL
/// gateway every page uses.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    gateway: GraphqlGateway,
    telemetry: SharedTelemetry,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Frontend configuration
    /// * `telemetry` - Sink for every caught error
    #[must_use]
    pub fn new(config: WebConfig, telemetry: SharedTelemetry) -> Self {
        let gateway = GraphqlGateway::new(&config.graphql, Arc::clone(&telemetry));

        Self {
            inner: Arc::new(AppStateInner {
                config,
                gateway,
                telemetry,
            }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    /// Get a reference to the GraphQL gateway.
    #[must_use]
    pub fn gateway(&self) -> &GraphqlGateway {
        &self.inner.gateway
    }

    /// Credential store over this request's browser session.
    #[must_use]
    pub fn credentials(&self, session: Session) -> CredentialStore<Session> {
        CredentialStore::new(session, Arc::clone(&self.inner.telemetry))
    }

    /// Session flow controller for this request's browser session.
    #[must_use]
    pub fn session_controller(
        &self,
        session: Session,
    ) -> SessionController<'_, GraphqlGateway, Session> {
        SessionController::new(self.gateway(), self.credentials(session))
    }
}
