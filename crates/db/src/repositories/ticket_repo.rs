//! Repository for the `tickets` table.
//!
//! Every lookup and listing excludes tickets in the `Deleted` lifecycle;
//! [`TicketRepo::find_by_id_include_deleted`] is the audit escape hatch.

use helpdesk_core::status::{Lifecycle, TicketPriority, TicketStatus};
use helpdesk_core::tickets::{PageRequest, TicketChanges, TicketSort};
use helpdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::ticket::{CreateTicket, Ticket, TicketFilter};

/// Column list for tickets queries.
const COLUMNS: &str = "id, subject, description, status_id, priority_id, created_by, \
    assigned_to_id, category_id, up_votes, down_votes, view_count, lifecycle_id, \
    deleted_at, created_at, updated_at";

/// Shared WHERE clause for listings and their counts.
///
/// `$1` lifecycle, `$2` status, `$3` category, `$4` assignee, `$5` creator
/// filter, `$6` creator scope, `$7` escaped search pattern.
const LIST_WHERE: &str = "lifecycle_id = $1
    AND ($2::SMALLINT IS NULL OR status_id = $2)
    AND ($3::BIGINT IS NULL OR category_id = $3)
    AND ($4::BIGINT IS NULL OR assigned_to_id = $4)
    AND ($5::BIGINT IS NULL OR created_by = $5)
    AND ($6::BIGINT IS NULL OR created_by = $6)
    AND ($7::TEXT IS NULL OR subject ILIKE $7 OR description ILIKE $7)";

/// Provides CRUD operations for tickets.
pub struct TicketRepo;

impl TicketRepo {
    /// Insert a new ticket with status `Open`.
    ///
    /// Returns `None` if the category does not exist or is deleted. The
    /// category row is share-locked until commit so a concurrent category
    /// delete cannot strand the reference.
    pub async fn create(
        pool: &PgPool,
        created_by: DbId,
        input: &CreateTicket,
        priority: TicketPriority,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let category: Option<DbId> = sqlx::query_scalar(
            "SELECT id FROM categories WHERE id = $1 AND lifecycle_id = $2 FOR SHARE",
        )
        .bind(input.category_id)
        .bind(Lifecycle::Active.id())
        .fetch_optional(&mut *tx)
        .await?;

        if category.is_none() {
            return Ok(None);
        }

        let query = format!(
            "INSERT INTO tickets (subject, description, status_id, priority_id, created_by, category_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let ticket = sqlx::query_as::<_, Ticket>(&query)
            .bind(&input.subject)
            .bind(&input.description)
            .bind(TicketStatus::Open.id())
            .bind(priority.id())
            .bind(created_by)
            .bind(input.category_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(ticket))
    }

    /// Find a live ticket by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tickets WHERE id = $1 AND lifecycle_id = $2");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(Lifecycle::Active.id())
            .fetch_optional(pool)
            .await
    }

    /// Find a ticket by ID regardless of lifecycle (audit access).
    pub async fn find_by_id_include_deleted(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tickets WHERE id = $1");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Increment the view count of a live ticket and return the new row.
    ///
    /// `updated_at` is left alone; views are not edits.
    pub async fn record_view(pool: &PgPool, id: DbId) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!(
            "UPDATE tickets SET view_count = view_count + 1
             WHERE id = $1 AND lifecycle_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(Lifecycle::Active.id())
            .fetch_optional(pool)
            .await
    }

    /// List one page of live tickets matching `filter`, plus the total count.
    ///
    /// Each row carries `reply_count`, which also backs the `most_replied`
    /// ordering. Ties are broken by id in the same direction so pages are
    /// stable.
    pub async fn list(
        pool: &PgPool,
        filter: &TicketFilter,
        sort: TicketSort,
        page: PageRequest,
    ) -> Result<(Vec<Ticket>, i64), sqlx::Error> {
        let direction = sort.direction.as_sql();
        let order_column = sort.key.column();
        let query = format!(
            "SELECT {COLUMNS},
                (SELECT COUNT(*) FROM comments c
                 WHERE c.ticket_id = tickets.id AND c.lifecycle_id = $1
                   AND ($8 OR NOT c.is_internal)) AS reply_count
             FROM tickets
             WHERE {LIST_WHERE}
             ORDER BY {order_column} {direction}, id {direction}
             LIMIT $9 OFFSET $10"
        );
        let items = sqlx::query_as::<_, Ticket>(&query)
            .bind(Lifecycle::Active.id())
            .bind(filter.status_id)
            .bind(filter.category_id)
            .bind(filter.assigned_to)
            .bind(filter.created_by)
            .bind(filter.owner_scope)
            .bind(&filter.search_pattern)
            .bind(filter.include_internal)
            .bind(page.page_size)
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM tickets WHERE {LIST_WHERE}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(Lifecycle::Active.id())
            .bind(filter.status_id)
            .bind(filter.category_id)
            .bind(filter.assigned_to)
            .bind(filter.created_by)
            .bind(filter.owner_scope)
            .bind(&filter.search_pattern)
            .fetch_one(pool)
            .await?;

        Ok((items, total))
    }

    /// Apply a validated, already-masked patch to a live ticket.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        changes: &TicketChanges,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!(
            "UPDATE tickets SET
                subject = COALESCE($2, subject),
                description = COALESCE($3, description),
                status_id = COALESCE($4, status_id),
                priority_id = COALESCE($5, priority_id),
                assigned_to_id = CASE WHEN $6 THEN $7 ELSE assigned_to_id END,
                updated_at = NOW()
             WHERE id = $1 AND lifecycle_id = $8
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(&changes.subject)
            .bind(&changes.description)
            .bind(changes.status.map(TicketStatus::id))
            .bind(changes.priority.map(TicketPriority::id))
            .bind(changes.assigned_to.is_some())
            .bind(changes.assigned_to.flatten())
            .bind(Lifecycle::Active.id())
            .fetch_optional(pool)
            .await
    }

    /// Assign a live ticket and move it to `InProgress` in one statement.
    pub async fn assign(
        pool: &PgPool,
        id: DbId,
        assignee_id: DbId,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!(
            "UPDATE tickets SET
                assigned_to_id = $2,
                status_id = $3,
                updated_at = NOW()
             WHERE id = $1 AND lifecycle_id = $4
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(assignee_id)
            .bind(TicketStatus::InProgress.id())
            .bind(Lifecycle::Active.id())
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a ticket and its comments. Returns `true` if the ticket
    /// was live.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "UPDATE tickets SET lifecycle_id = $2, deleted_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND lifecycle_id = $3",
        )
        .bind(id)
        .bind(Lifecycle::Deleted.id())
        .bind(Lifecycle::Active.id())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("UPDATE comments SET lifecycle_id = $2 WHERE ticket_id = $1 AND lifecycle_id = $3")
            .bind(id)
            .bind(Lifecycle::Deleted.id())
            .bind(Lifecycle::Active.id())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }
}
