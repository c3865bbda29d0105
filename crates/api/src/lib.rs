//! Spookify API server library.
//!
//! Exposes config, state, error handling, routes, and the shared router
//! builder so integration tests and the binary entrypoint use the same
//! building blocks.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod mail;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
