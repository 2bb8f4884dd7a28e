//! Event-to-notification routing engine.
//!
//! [`NotificationRouter`] consumes ticket lifecycle events from the
//! broadcast channel, resolves who should hear about each one and hands the
//! event to the configured [`Delivery`] channel. Delivery failures are
//! logged and never reach the request that produced the event.

use helpdesk_core::event_types::{
    EVENT_TICKET_ASSIGNED, EVENT_TICKET_COMMENT_ADDED, EVENT_TICKET_CREATED, EVENT_TICKET_UPDATED,
};
use helpdesk_core::roles::Role;
use helpdesk_core::types::DbId;
use helpdesk_db::repositories::UserRepo;
use helpdesk_db::DbPool;
use helpdesk_events::{Delivery, PlatformEvent, Recipient};
use tokio::sync::broadcast;

/// Decide which users an event concerns.
///
/// - `ticket.created`: the creator and every active agent
/// - `ticket.updated`: the creator
/// - `ticket.assigned`: the assignee
/// - `ticket.comment_added`: the creator (public comments only) and the
///   assignee, never the comment author
///
/// The result is deduplicated and keeps first-seen order. Unknown event
/// types concern nobody.
pub fn recipient_ids(event: &PlatformEvent, active_agents: &[DbId]) -> Vec<DbId> {
    let creator = event.payload_id("created_by");
    let assignee = event.payload_id("assigned_to_id");

    let candidates: Vec<DbId> = match event.event_type.as_str() {
        EVENT_TICKET_CREATED => creator.into_iter().chain(active_agents.iter().copied()).collect(),
        EVENT_TICKET_UPDATED => creator.into_iter().collect(),
        EVENT_TICKET_ASSIGNED => assignee.into_iter().collect(),
        EVENT_TICKET_COMMENT_ADDED => {
            let public_creator = creator.filter(|_| !event.payload_flag("is_internal"));
            public_creator
                .into_iter()
                .chain(assignee)
                .filter(|id| Some(*id) != event.actor_user_id)
                .collect()
        }
        _ => Vec::new(),
    };

    let mut recipients = Vec::with_capacity(candidates.len());
    for id in candidates {
        if !recipients.contains(&id) {
            recipients.push(id);
        }
    }
    recipients
}

/// Routes platform events to user notifications.
pub struct NotificationRouter {
    pool: DbPool,
    delivery: Delivery,
}

impl NotificationRouter {
    pub fn new(pool: DbPool, delivery: Delivery) -> Self {
        Self { pool, delivery }
    }

    /// Run the main routing loop.
    ///
    /// The loop exits when the channel is closed, i.e. when the
    /// [`EventBus`](helpdesk_events::EventBus) is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.route_event(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to route event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// Route a single event to all affected users.
    async fn route_event(
        &self,
        event: &PlatformEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let active_agents = if event.event_type == EVENT_TICKET_CREATED {
            UserRepo::list_active_ids_by_role(&self.pool, Role::Agent).await?
        } else {
            Vec::new()
        };

        for user_id in recipient_ids(event, &active_agents) {
            let Some(user) = UserRepo::find_by_id(&self.pool, user_id).await? else {
                continue;
            };
            if !user.is_active {
                continue;
            }

            let recipient = Recipient {
                user_id,
                email: user.email,
            };
            // One failed address must not stop the others.
            if let Err(e) = self.delivery.deliver(&recipient, event).await {
                tracing::warn!(
                    error = %e,
                    user_id,
                    event_type = %event.event_type,
                    "Notification delivery failed"
                );
            }
        }

        Ok(())
    }
}
