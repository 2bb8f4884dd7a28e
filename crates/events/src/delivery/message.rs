//! Plain-text rendering of ticket notifications.

use helpdesk_core::event_types::{
    EVENT_TICKET_ASSIGNED, EVENT_TICKET_COMMENT_ADDED, EVENT_TICKET_CREATED, EVENT_TICKET_UPDATED,
};

use crate::bus::PlatformEvent;

const SUBJECT_PREFIX: &str = "[Helpdesk]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub subject: String,
    pub body: String,
}

/// Render the subject line and body for an event.
pub fn render(event: &PlatformEvent) -> RenderedMessage {
    let ticket_id = event.source_entity_id.unwrap_or_default();
    let title = event.payload_str("subject").unwrap_or("(no subject)");

    let (subject, lead) = match event.event_type.as_str() {
        EVENT_TICKET_CREATED => (
            format!("{SUBJECT_PREFIX} New ticket #{ticket_id}: {title}"),
            "A new ticket has been created.".to_string(),
        ),
        EVENT_TICKET_UPDATED => {
            let fields = event
                .payload
                .get("changed_fields")
                .and_then(serde_json::Value::as_array)
                .map(|fields| {
                    fields
                        .iter()
                        .filter_map(serde_json::Value::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_default();
            (
                format!("{SUBJECT_PREFIX} Ticket #{ticket_id} updated: {title}"),
                format!("Your ticket was updated. Changed: {fields}."),
            )
        }
        EVENT_TICKET_ASSIGNED => (
            format!("{SUBJECT_PREFIX} Ticket #{ticket_id} assigned to you: {title}"),
            "A ticket has been assigned to you.".to_string(),
        ),
        EVENT_TICKET_COMMENT_ADDED => (
            format!("{SUBJECT_PREFIX} New comment on ticket #{ticket_id}: {title}"),
            event
                .payload_str("content")
                .map(|c| format!("New comment:\n\n{c}"))
                .unwrap_or_else(|| "A new comment was added.".to_string()),
        ),
        other => (
            format!("{SUBJECT_PREFIX} {other}"),
            format!("Event {other} on ticket #{ticket_id}."),
        ),
    };

    RenderedMessage {
        subject,
        body: format!("{lead}\n\nTicket: #{ticket_id} {title}\nTime: {}\n", event.timestamp),
    }
}
