//! Ticket vote model and DTOs.

use helpdesk_core::status::{StatusId, VoteType};
use helpdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `votes` table. At most one per (ticket, user).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Vote {
    pub id: DbId,
    pub ticket_id: DbId,
    pub user_id: DbId,
    pub vote_type_id: StatusId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for casting a vote.
#[derive(Debug, Deserialize)]
pub struct CastVote {
    pub vote_type: VoteType,
}

/// What a vote call did to the caller's existing vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteOutcome {
    Created,
    Changed,
    Unchanged,
}

/// Result of a vote: the outcome plus the recomputed ticket aggregates.
#[derive(Debug, Clone, Serialize)]
pub struct VoteResult {
    pub outcome: VoteOutcome,
    pub vote_type: VoteType,
    pub up_votes: i32,
    pub down_votes: i32,
}
