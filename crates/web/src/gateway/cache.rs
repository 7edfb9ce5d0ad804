//! Cache types for read-query responses.

use orderdesk_core::{Order, User, UserId};

/// Cache key for read queries.
///
/// `authorization` is the exact header value the query was sent with, so
/// responses are never shared across sessions.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Users {
        authorization: Option<String>,
    },
    Orders {
        user_id: UserId,
        authorization: Option<String>,
    },
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Users(Vec<User>),
    Orders(Vec<Order>),
}
