//! Repository for the `comments` table. Comments are append-only.

use helpdesk_core::status::Lifecycle;
use helpdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::comment::Comment;

/// Column list for comments queries.
const COLUMNS: &str = "id, ticket_id, author_id, content, is_internal, lifecycle_id, created_at";

pub struct CommentRepo;

impl CommentRepo {
    /// Append a comment to a live ticket.
    ///
    /// The ticket row is share-locked for the insert so a concurrent soft
    /// delete either sees this comment in its cascade or makes this return
    /// `None`.
    pub async fn create(
        pool: &PgPool,
        ticket_id: DbId,
        author_id: DbId,
        content: &str,
        is_internal: bool,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let live: Option<DbId> = sqlx::query_scalar(
            "SELECT id FROM tickets WHERE id = $1 AND lifecycle_id = $2 FOR SHARE",
        )
        .bind(ticket_id)
        .bind(Lifecycle::Active.id())
        .fetch_optional(&mut *tx)
        .await?;

        if live.is_none() {
            return Ok(None);
        }

        let query = format!(
            "INSERT INTO comments (ticket_id, author_id, content, is_internal)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let comment = sqlx::query_as::<_, Comment>(&query)
            .bind(ticket_id)
            .bind(author_id)
            .bind(content)
            .bind(is_internal)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(comment))
    }

    /// Live comments on a ticket, oldest first. Internal comments are
    /// omitted unless `include_internal` is set.
    pub async fn list_for_ticket(
        pool: &PgPool,
        ticket_id: DbId,
        include_internal: bool,
    ) -> Result<Vec<Comment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM comments
             WHERE ticket_id = $1 AND lifecycle_id = $2 AND ($3 OR NOT is_internal)
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(ticket_id)
            .bind(Lifecycle::Active.id())
            .bind(include_internal)
            .fetch_all(pool)
            .await
    }
}
