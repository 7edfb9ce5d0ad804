//! Orderdesk Core - Shared domain types.
//!
//! This crate provides the types shared between the web frontend and its
//! tests:
//! - `web` - Server-rendered login, signup and listing pages
//! - `integration-tests` - Black-box tests against a fake GraphQL server
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Records here
//! are read-only views of what the GraphQL API returns; nothing is mutated
//! locally.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, user and order records, page routes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
