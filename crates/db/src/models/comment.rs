//! Ticket comment model and DTOs.

use helpdesk_core::status::StatusId;
use helpdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `comments` table. Comments are append-only.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Comment {
    pub id: DbId,
    pub ticket_id: DbId,
    pub author_id: DbId,
    pub content: String,
    pub is_internal: bool,
    #[serde(skip_serializing)]
    pub lifecycle_id: StatusId,
    pub created_at: Timestamp,
}

/// Request body for adding a comment.
#[derive(Debug, Deserialize)]
pub struct CreateComment {
    pub content: String,
    #[serde(default)]
    pub is_internal: bool,
}
