//! Notification routing infrastructure.
//!
//! The [`NotificationRouter`] subscribes to the event bus and delivers a
//! notification for each ticket lifecycle event to the users it concerns.

pub mod router;

pub use router::{recipient_ids, NotificationRouter};
