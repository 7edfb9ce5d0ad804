//! Orderdesk frontend library.
//!
//! Server-rendered pages over an upstream GraphQL API: login and signup
//! forms, a user listing, and the orders of the selected user. The session
//! token lives in a cookie-keyed server session and is attached to every
//! read query.
//!
//! This crate provides the frontend as a library so the binary and the
//! integration tests build the exact same router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod credentials;
pub mod error;
pub mod gateway;
pub mod middleware;
pub mod routes;
pub mod sequencer;
pub mod session;
pub mod state;
pub mod telemetry;

#[cfg(test)]
mod testing;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::config::WebConfig;
use crate::error::AppError;
use crate::state::AppState;

/// Build the full application router.
///
/// Includes the session, request ID and tracing layers. Sentry layers are
/// added by [`serve`] so tests can run without a Sentry hub per request.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .layer(session_layer)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the configured address and serve until a shutdown signal arrives.
///
/// # Errors
///
/// Returns `AppError::Bind` if the address is taken and `AppError::Serve` if
/// the server stops with an I/O error.
pub async fn serve(state: AppState) -> error::Result<()> {
    let addr = state.config().socket_addr();

    let app = app(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| AppError::Bind { addr, source })?;
    tracing::info!("orderdesk-web listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Serve)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the GraphQL API.
async fn health() -> &'static str {
    "ok"
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
