//! User records as served by the `users` query.

use serde::{Deserialize, Serialize};

use crate::UserId;

/// A user listed on the home page.
///
/// Read-only; the frontend never mutates users locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
}
