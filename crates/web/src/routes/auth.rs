//! Authentication route handlers.
//!
//! Login stores the returned token in the browser's session; signup only
//! creates the account. A failed submission re-renders the same form with
//! the entered email kept and no message shown.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::session::FlowOutcome;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Signup form data.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub email: String,
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "signup.html")]
pub struct SignupTemplate {
    pub name: String,
    pub email: String,
}

fn respond(outcome: FlowOutcome, form: impl IntoResponse) -> Response {
    match outcome {
        FlowOutcome::Navigate(route) => Redirect::to(route.path()).into_response(),
        FlowOutcome::Stay => form.into_response(),
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page() -> impl IntoResponse {
    LoginTemplate {
        email: String::new(),
    }
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let mut controller = state.session_controller(session);
    let outcome = controller.login(&form.email, &form.password).await;

    respond(outcome, LoginTemplate { email: form.email })
}

// =============================================================================
// Signup Routes
// =============================================================================

/// Display the signup page.
pub async fn signup_page() -> impl IntoResponse {
    SignupTemplate {
        name: String::new(),
        email: String::new(),
    }
}

/// Handle signup form submission.
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Response {
    let mut controller = state.session_controller(session);
    let outcome = controller
        .signup(&form.name, &form.email, &form.password)
        .await;

    respond(
        outcome,
        SignupTemplate {
            name: form.name,
            email: form.email,
        },
    )
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    let mut controller = state.session_controller(session);
    let outcome = controller.logout().await;

    respond(outcome, Redirect::to(orderdesk_core::Route::Login.path()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_template_keeps_email() {
        let html = LoginTemplate {
            email: "a@b.com".to_string(),
        }
        .render()
        .expect("render");
        assert!(html.contains(r#"value="a@b.com""#));
        assert!(html.contains(r#"action="/login""#));
    }

    #[test]
    fn test_signup_template_links_to_login() {
        let html = SignupTemplate {
            name: String::new(),
            email: String::new(),
        }
        .render()
        .expect("render");
        assert!(html.contains(r#"action="/signup""#));
        assert!(html.contains(r#"href="/login""#));
    }

    #[test]
    fn test_forms_leave_validation_to_the_server() {
        let login = LoginTemplate {
            email: String::new(),
        }
        .render()
        .expect("render");
        let signup = SignupTemplate {
            name: String::new(),
            email: String::new(),
        }
        .render()
        .expect("render");
        for html in [login, signup] {
            assert!(!html.contains("required"));
            assert!(html.contains("novalidate"));
        }
    }

    #[test]
    fn test_stay_renders_form() {
        let response = respond(
            FlowOutcome::Stay,
            LoginTemplate {
                email: String::new(),
            },
        );
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }

    #[test]
    fn test_navigate_redirects() {
        let response = respond(
            FlowOutcome::Navigate(orderdesk_core::Route::Home),
            LoginTemplate {
                email: String::new(),
            },
        );
        assert_eq!(response.status(), axum::http::StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(axum::http::header::LOCATION).map(|v| v.as_bytes()),
            Some(b"/home".as_slice())
        );
    }
}
