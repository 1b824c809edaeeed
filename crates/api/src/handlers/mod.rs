//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource.
//! Handlers validate input, delegate to the corresponding repository in
//! `bastion_db`, publish a [`ChangeEvent`](bastion_events::ChangeEvent) for
//! every mutation and map errors via [`AppError`](crate::error::AppError).

pub mod activity;
pub mod alert;
pub mod board_report;
pub mod briefing;
pub mod collaboration;
pub mod demo;
pub mod organization;
pub mod playbook;
pub mod scenario;
pub mod signal;
pub mod task;
pub mod trigger;
pub mod user;
pub mod war_room;
