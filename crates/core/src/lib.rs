//! Domain rules for the helpdesk ticket tracker.
//!
//! This crate has no I/O. It holds the identifier and timestamp aliases, the
//! error taxonomy, the enumerations mirrored by the database lookup tables,
//! and the authorization and validation rules every transport must enforce.

#[macro_use]
pub mod status;

pub mod access;
pub mod categories;
pub mod comments;
pub mod error;
pub mod event_types;
pub mod roles;
pub mod tickets;
pub mod types;
