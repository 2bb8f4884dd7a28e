//! Helpdesk event bus and notification delivery.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`. Handlers publish after their mutation commits.
//! - [`PlatformEvent`]: the event envelope carried on the bus.
//! - [`delivery`]: outbound channels (SMTP email, or a log-only fallback).

pub mod bus;
pub mod delivery;

pub use bus::{EventBus, PlatformEvent};
pub use delivery::email::{EmailConfig, EmailDelivery, EmailError};
pub use delivery::{Delivery, Recipient};
