//! Bastion domain core.
//!
//! Pure logic shared by the database, event and API crates: id/time types,
//! the domain error, status vocabularies, the seeded playbook library, the
//! signal catalogue with trigger evaluation, decision-room state and the
//! collaboration wire protocol. Nothing in this crate performs I/O.

pub mod activity;
pub mod collaboration;
pub mod demo;
pub mod error;
pub mod library;
pub mod pagination;
pub mod signals;
pub mod status;
pub mod types;
