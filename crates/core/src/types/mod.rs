//! Core types for Orderdesk.
//!
//! This module provides type-safe wrappers for the records the GraphQL API
//! serves and the pages the frontend navigates between.

pub mod id;
pub mod order;
pub mod route;
pub mod user;

pub use id::*;
pub use order::Order;
pub use route::{Route, RouteError};
pub use user::User;
