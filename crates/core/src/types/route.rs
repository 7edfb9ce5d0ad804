//! Page routes the frontend navigates between.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a path does not name a known page.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown route: {0}")]
pub struct RouteError(pub String);

/// A navigable page.
///
/// - login success -> [`Route::Home`]
/// - signup success -> [`Route::Login`]
/// - logout -> [`Route::Login`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Login,
    Signup,
    Home,
}

impl Route {
    /// The URL path of this page.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Signup => "/signup",
            Self::Home => "/home",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Route {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "/login" => Ok(Self::Login),
            "/signup" => Ok(Self::Signup),
            "/home" => Ok(Self::Home),
            other => Err(RouteError(other.to_owned())),
        }
    }
}
