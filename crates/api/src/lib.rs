//! Bastion API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! WebSocket collaboration layer, briefing composer) so integration tests
//! and the binary entrypoint share them.

pub mod briefing;
pub mod config;
pub mod error;
pub mod handlers;
pub mod notifications;
pub mod readiness;
pub mod router;
pub mod routes;
pub mod state;
pub mod ws;
