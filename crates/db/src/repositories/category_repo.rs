//! Repository for the `categories` table.
//!
//! Categories are never hard-deleted: removal moves the row to the
//! `Deleted` lifecycle, and only while no live ticket references it.

use helpdesk_core::status::Lifecycle;
use helpdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::category::{Category, CategoryDeleteOutcome, CreateCategory, UpdateCategory};

/// Column list for categories queries.
const COLUMNS: &str = "id, name, description, color, is_active, lifecycle_id, created_at, updated_at";

/// Provides CRUD operations for ticket categories.
pub struct CategoryRepo;

impl CategoryRepo {
    /// List live categories ordered by name. Inactive ones are included
    /// only when `include_inactive` is set.
    pub async fn list(pool: &PgPool, include_inactive: bool) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM categories
             WHERE lifecycle_id = $1 AND ($2 OR is_active)
             ORDER BY name"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(Lifecycle::Active.id())
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    /// Find a live category by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = $1 AND lifecycle_id = $2");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(Lifecycle::Active.id())
            .fetch_optional(pool)
            .await
    }

    /// Whether a live category other than `exclude_id` already uses `name`.
    pub async fn name_exists(
        pool: &PgPool,
        name: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM categories
                WHERE name = $1 AND lifecycle_id = $2 AND ($3::BIGINT IS NULL OR id <> $3)
             )",
        )
        .bind(name)
        .bind(Lifecycle::Active.id())
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    /// Insert a new category. A concurrent insert of the same name fails on
    /// `uq_categories_name`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateCategory,
        color: &str,
    ) -> Result<Category, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories (name, description, color)
             VALUES ($1, COALESCE($2, ''), $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(color)
            .fetch_one(pool)
            .await
    }

    /// Update a live category, returning the updated row.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCategory,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "UPDATE categories SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                color = COALESCE($4, color),
                is_active = COALESCE($5, is_active)
             WHERE id = $1 AND lifecycle_id = $6
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.color)
            .bind(input.is_active)
            .bind(Lifecycle::Active.id())
            .fetch_optional(pool)
            .await
    }

    /// Delete a category unless live tickets still reference it.
    ///
    /// The category row is locked `FOR UPDATE` while counting, and ticket
    /// creation takes `FOR SHARE` on it, so no ticket can be attached between
    /// the count and the lifecycle transition.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<CategoryDeleteOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked: Option<DbId> = sqlx::query_scalar(
            "SELECT id FROM categories WHERE id = $1 AND lifecycle_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(Lifecycle::Active.id())
        .fetch_optional(&mut *tx)
        .await?;

        if locked.is_none() {
            return Ok(CategoryDeleteOutcome::NotFound);
        }

        let reference_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM tickets WHERE category_id = $1 AND lifecycle_id = $2",
        )
        .bind(id)
        .bind(Lifecycle::Active.id())
        .fetch_one(&mut *tx)
        .await?;

        if reference_count > 0 {
            return Ok(CategoryDeleteOutcome::InUse(reference_count));
        }

        sqlx::query("UPDATE categories SET lifecycle_id = $2 WHERE id = $1")
            .bind(id)
            .bind(Lifecycle::Deleted.id())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(CategoryDeleteOutcome::Deleted)
    }
}
