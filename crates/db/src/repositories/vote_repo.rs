//! Repository for the `votes` table and the ticket vote aggregates.

use helpdesk_core::status::{Lifecycle, StatusId, VoteType};
use helpdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::vote::{VoteOutcome, VoteResult};

pub struct VoteRepo;

impl VoteRepo {
    /// Cast or change a user's vote on a live ticket.
    ///
    /// Runs in one transaction: the ticket row is locked `FOR UPDATE`, the
    /// vote is upserted on `uq_votes_ticket_user`, and both aggregates are
    /// recomputed from the vote table before commit. Votes on one ticket are
    /// therefore serialized and the counts always equal the stored votes.
    ///
    /// Returns `None` if the ticket does not exist or is deleted.
    pub async fn cast(
        pool: &PgPool,
        ticket_id: DbId,
        user_id: DbId,
        vote_type: VoteType,
    ) -> Result<Option<VoteResult>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked: Option<DbId> = sqlx::query_scalar(
            "SELECT id FROM tickets WHERE id = $1 AND lifecycle_id = $2 FOR UPDATE",
        )
        .bind(ticket_id)
        .bind(Lifecycle::Active.id())
        .fetch_optional(&mut *tx)
        .await?;

        if locked.is_none() {
            return Ok(None);
        }

        let previous: Option<StatusId> = sqlx::query_scalar(
            "SELECT vote_type_id FROM votes WHERE ticket_id = $1 AND user_id = $2",
        )
        .bind(ticket_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let outcome = match previous {
            None => VoteOutcome::Created,
            Some(id) if id == vote_type.id() => VoteOutcome::Unchanged,
            Some(_) => VoteOutcome::Changed,
        };

        if outcome != VoteOutcome::Unchanged {
            sqlx::query(
                "INSERT INTO votes (ticket_id, user_id, vote_type_id)
                 VALUES ($1, $2, $3)
                 ON CONFLICT ON CONSTRAINT uq_votes_ticket_user
                 DO UPDATE SET vote_type_id = EXCLUDED.vote_type_id
                 WHERE votes.vote_type_id <> EXCLUDED.vote_type_id",
            )
            .bind(ticket_id)
            .bind(user_id)
            .bind(vote_type.id())
            .execute(&mut *tx)
            .await?;
        }

        let (up_votes, down_votes): (i32, i32) = sqlx::query_as(
            "UPDATE tickets SET
                up_votes = (SELECT COUNT(*) FROM votes WHERE ticket_id = $1 AND vote_type_id = $2),
                down_votes = (SELECT COUNT(*) FROM votes WHERE ticket_id = $1 AND vote_type_id = $3)
             WHERE id = $1
             RETURNING up_votes, down_votes",
        )
        .bind(ticket_id)
        .bind(VoteType::Up.id())
        .bind(VoteType::Down.id())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(VoteResult {
            outcome,
            vote_type,
            up_votes,
            down_votes,
        }))
    }

    /// The vote a user currently holds on a ticket, if any.
    pub async fn find_user_vote(
        pool: &PgPool,
        ticket_id: DbId,
        user_id: DbId,
    ) -> Result<Option<VoteType>, sqlx::Error> {
        let id: Option<StatusId> = sqlx::query_scalar(
            "SELECT vote_type_id FROM votes WHERE ticket_id = $1 AND user_id = $2",
        )
        .bind(ticket_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
        Ok(id.and_then(VoteType::from_id))
    }
}
