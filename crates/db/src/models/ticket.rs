//! Ticket model and DTOs.

use helpdesk_core::status::{StatusId, VoteType};
use helpdesk_core::types::{deserialize_present, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::comment::Comment;

/// A row from the `tickets` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Ticket {
    pub id: DbId,
    pub subject: String,
    pub description: String,
    pub status_id: StatusId,
    pub priority_id: StatusId,
    pub created_by: DbId,
    pub assigned_to_id: Option<DbId>,
    pub category_id: DbId,
    pub up_votes: i32,
    pub down_votes: i32,
    pub view_count: i64,
    #[serde(skip_serializing)]
    pub lifecycle_id: StatusId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Live comments visible to the viewer; only populated by listings.
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_count: Option<i64>,
}

/// DTO for creating a new ticket.
#[derive(Debug, Deserialize)]
pub struct CreateTicket {
    pub subject: String,
    pub description: String,
    pub priority_id: Option<StatusId>,
    pub category_id: DbId,
}

/// Request body for updating a ticket.
///
/// `assigned_to_id` distinguishes an absent key (leave unchanged) from an
/// explicit `null` (clear the assignee).
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTicket {
    pub subject: Option<String>,
    pub description: Option<String>,
    pub status_id: Option<StatusId>,
    pub priority_id: Option<StatusId>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub assigned_to_id: Option<Option<DbId>>,
}

/// Request body for assigning a ticket.
#[derive(Debug, Deserialize)]
pub struct AssignTicket {
    pub assigned_to_id: DbId,
}

/// Query parameters for listing tickets.
#[derive(Debug, Default, Deserialize)]
pub struct TicketListParams {
    pub status_id: Option<StatusId>,
    pub category_id: Option<DbId>,
    pub assigned_to: Option<DbId>,
    pub created_by: Option<DbId>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Resolved listing filter passed to the repository.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub status_id: Option<StatusId>,
    pub category_id: Option<DbId>,
    pub assigned_to: Option<DbId>,
    pub created_by: Option<DbId>,
    /// Creator restriction from the principal's role; ANDed with `created_by`.
    pub owner_scope: Option<DbId>,
    /// Escaped `ILIKE` pattern over subject and description.
    pub search_pattern: Option<String>,
    /// Whether internal comments count towards `reply_count`.
    pub include_internal: bool,
}

/// A ticket with its visible comment thread and the viewer's own vote.
#[derive(Debug, Clone, Serialize)]
pub struct TicketDetail {
    pub ticket: Ticket,
    pub comments: Vec<Comment>,
    pub viewer_vote: Option<VoteType>,
}
