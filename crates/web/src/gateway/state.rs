//! Observable state of a single query.

use super::GatewayError;

/// Tri-state query result: exactly one of loading, failed, or ready.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
    /// The operation has been issued and has not resolved.
    Loading,
    /// The operation failed; holds the message to render after `Error: `.
    Failed(String),
    /// The operation resolved with data.
    Ready(T),
}

impl<T> QueryState<T> {
    /// Whether the operation is still in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// The error message, if the operation failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// The data, if the operation resolved.
    #[must_use]
    pub const fn data(&self) -> Option<&T> {
        match self {
            Self::Ready(data) => Some(data),
            _ => None,
        }
    }
}

impl<T> From<Result<T, GatewayError>> for QueryState<T> {
    fn from(result: Result<T, GatewayError>) -> Self {
        match result {
            Ok(data) => Self::Ready(data),
            Err(e) => Self::Failed(e.user_message()),
        }
    }
}
