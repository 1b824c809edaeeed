//! WebSocket infrastructure for real-time collaboration.
//!
//! Provides connection management, the decision-room registry and its
//! message handling, heartbeat monitoring, and the HTTP upgrade handler.

pub mod collaboration;
mod handler;
mod heartbeat;
pub mod manager;
pub mod rooms;

pub use collaboration::CollaborationService;
pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
