//! Event type names published on the event bus.

pub const EVENT_TICKET_CREATED: &str = "ticket.created";
pub const EVENT_TICKET_UPDATED: &str = "ticket.updated";
pub const EVENT_TICKET_ASSIGNED: &str = "ticket.assigned";
pub const EVENT_TICKET_COMMENT_ADDED: &str = "ticket.comment_added";

/// Source entity type attached to every ticket event.
pub const ENTITY_TICKET: &str = "ticket";
