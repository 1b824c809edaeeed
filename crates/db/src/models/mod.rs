//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//! - Where the resource is listable, a `Deserialize` filter read from the
//!   query string
//!
//! JSON field names are camelCase throughout.

pub mod activity;
pub mod alert;
pub mod board_report;
pub mod briefing;
pub mod dashboard;
pub mod organization;
pub mod playbook;
pub mod scenario;
pub mod signal;
pub mod task;
pub mod trigger;
pub mod user;
pub mod war_room;
