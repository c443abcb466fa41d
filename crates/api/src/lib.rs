//! webclone API server library.
//!
//! Exposes config, state, error handling, routes and the WebSocket handler
//! so the binary and the integration tests build the same application.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod routes;
pub mod state;
pub mod ws;
