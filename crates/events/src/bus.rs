//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` in the application state.
//! Publishing never blocks and never fails the caller: with no subscriber
//! the event is dropped, and a slow subscriber observes `Lagged`.

use chrono::{DateTime, Utc};
use helpdesk_core::event_types::ENTITY_TICKET;
use helpdesk_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// PlatformEvent
// ---------------------------------------------------------------------------

/// A lifecycle event that happened to a helpdesk entity.
///
/// Built with [`PlatformEvent::new`] (or [`PlatformEvent::ticket`]) and the
/// `with_*` builder methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEvent {
    /// Dot-separated event name, e.g. `"ticket.assigned"`.
    pub event_type: String,

    pub source_entity_type: Option<String>,

    pub source_entity_id: Option<DbId>,

    /// The user whose request produced the event.
    pub actor_user_id: Option<DbId>,

    /// Event-specific data (subject, creator, assignee, ...).
    pub payload: serde_json::Value,

    pub timestamp: DateTime<Utc>,
}

impl PlatformEvent {
    /// Create an event with only its type set and an empty object payload.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source_entity_type: None,
            source_entity_id: None,
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Shorthand for an event about a ticket, triggered by `actor`.
    pub fn ticket(event_type: impl Into<String>, ticket_id: DbId, actor: DbId) -> Self {
        Self::new(event_type)
            .with_source(ENTITY_TICKET, ticket_id)
            .with_actor(actor)
    }

    pub fn with_source(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.source_entity_type = Some(entity_type.into());
        self.source_entity_id = Some(entity_id);
        self
    }

    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Read an integer id out of the payload (`null` or missing is `None`).
    pub fn payload_id(&self, key: &str) -> Option<DbId> {
        self.payload.get(key).and_then(serde_json::Value::as_i64)
    }

    /// Read a string out of the payload.
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(serde_json::Value::as_str)
    }

    /// Read a boolean out of the payload, defaulting to `false`.
    pub fn payload_flag(&self, key: &str) -> bool {
        self.payload
            .get(key)
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
pub struct EventBus {
    sender: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest unconsumed events are dropped.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: PlatformEvent) {
        // A SendError only means there are zero receivers.
        if self.sender.send(event).is_err() {
            tracing::trace!("Event published with no subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use helpdesk_core::event_types::{EVENT_TICKET_ASSIGNED, EVENT_TICKET_CREATED};

    #[tokio::test]
    async fn ticket_event_reaches_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(
            PlatformEvent::ticket(EVENT_TICKET_ASSIGNED, 42, 7)
                .with_payload(serde_json::json!({"assigned_to_id": 9, "subject": "VPN down"})),
        );

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, "ticket.assigned");
        assert_eq!(received.source_entity_type.as_deref(), Some("ticket"));
        assert_eq!(received.source_entity_id, Some(42));
        assert_eq!(received.actor_user_id, Some(7));
        assert_eq!(received.payload_id("assigned_to_id"), Some(9));
        assert_eq!(received.payload_str("subject"), Some("VPN down"));
    }

    #[tokio::test]
    async fn every_subscriber_gets_a_copy() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(PlatformEvent::new(EVENT_TICKET_CREATED));

        assert_eq!(rx1.recv().await.unwrap().event_type, EVENT_TICKET_CREATED);
        assert_eq!(rx2.recv().await.unwrap().event_type, EVENT_TICKET_CREATED);
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        let bus = EventBus::default();
        bus.publish(PlatformEvent::new("orphan.event"));
    }

    #[test]
    fn payload_accessors_tolerate_missing_and_null() {
        let event = PlatformEvent::new("x").with_payload(serde_json::json!({"assigned_to_id": null}));
        assert_eq!(event.payload_id("assigned_to_id"), None);
        assert_eq!(event.payload_id("created_by"), None);
        assert!(!event.payload_flag("is_internal"));
    }
}
