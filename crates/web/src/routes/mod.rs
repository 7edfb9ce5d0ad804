//! HTTP route handlers for the frontend.
//!
//! # Route Structure
//!
//! ```text
//! GET  /              - Redirect to /login
//! GET  /health        - Health check
//!
//! # Auth
//! GET  /login         - Login page
//! POST /login         - Login action (success redirects to /home)
//! GET  /signup        - Signup page
//! POST /signup        - Signup action (success redirects to /login)
//! POST /logout        - Logout action (always redirects to /login)
//!
//! # Listing (requires a stored token)
//! GET  /home          - User list
//! GET  /home?user=ID  - User list plus that user's orders
//! ```

pub mod auth;
pub mod home;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};
use orderdesk_core::Route;

use crate::state::AppState;

/// Create the page routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/logout", post(auth::logout))
        .route("/home", get(home::show))
}

/// The landing path always leads to the login page.
async fn root() -> Redirect {
    Redirect::to(Route::Login.path())
}
