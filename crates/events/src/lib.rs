//! Change-event bus and activity logging.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`ChangeEvent`]: the envelope published after every mutation.
//! - [`ActivityPersistence`]: background service that appends every event
//!   to `activity_logs`.
//!
//! The WebSocket fan-out of `entity_changed` frames lives in the API crate,
//! which owns the connection registry.

pub mod bus;
pub mod persistence;

pub use bus::{ChangeEvent, EventBus};
pub use persistence::ActivityPersistence;
