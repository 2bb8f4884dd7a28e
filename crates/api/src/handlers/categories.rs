//! Handlers for the `/categories` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use helpdesk_core::access::can_view_inactive_categories;
use helpdesk_core::categories::{
    validate_category_color, validate_category_description, validate_category_name,
    DEFAULT_CATEGORY_COLOR,
};
use helpdesk_core::error::CoreError;
use helpdesk_core::types::DbId;
use helpdesk_db::models::category::{CategoryDeleteOutcome, CreateCategory, UpdateCategory};
use helpdesk_db::repositories::CategoryRepo;
use helpdesk_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::IncludeInactiveParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn category_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Category",
        id,
    })
}

/// Reject a name already used by another live category.
///
/// The partial unique index `uq_categories_name` catches the races this
/// pre-check misses.
async fn ensure_name_available(pool: &DbPool, name: &str, exclude_id: Option<DbId>) -> AppResult<()> {
    if CategoryRepo::name_exists(pool, name, exclude_id).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Category '{name}' already exists"
        ))));
    }
    Ok(())
}

/// GET /api/v1/categories?include_inactive=true
///
/// Inactive categories are listed only for admins who ask for them.
pub async fn list_categories(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<impl IntoResponse> {
    let include_inactive = can_view_inactive_categories(&auth.principal())
        && params.include_inactive.unwrap_or(true);
    let categories = CategoryRepo::list(&state.pool, include_inactive).await?;
    Ok(Json(DataResponse { data: categories }))
}

/// POST /api/v1/categories
pub async fn create_category(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateCategory>,
) -> AppResult<impl IntoResponse> {
    validate_category_name(&input.name).map_err(AppError::validation)?;
    if let Some(description) = &input.description {
        validate_category_description(description).map_err(AppError::validation)?;
    }
    let color = input
        .color
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CATEGORY_COLOR)
        .to_string();
    validate_category_color(&color).map_err(AppError::validation)?;

    ensure_name_available(&state.pool, &input.name, None).await?;

    let category = CategoryRepo::create(&state.pool, &input, &color).await?;

    tracing::info!(
        user_id = admin.user_id,
        category_id = category.id,
        name = %category.name,
        "Category created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: category })))
}

/// GET /api/v1/categories/{id}
pub async fn get_category(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let category = CategoryRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|c| c.is_active || can_view_inactive_categories(&auth.principal()))
        .ok_or_else(|| category_not_found(id))?;
    Ok(Json(DataResponse { data: category }))
}

/// PUT /api/v1/categories/{id}
pub async fn update_category(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCategory>,
) -> AppResult<impl IntoResponse> {
    if let Some(name) = &input.name {
        validate_category_name(name).map_err(AppError::validation)?;
    }
    if let Some(description) = &input.description {
        validate_category_description(description).map_err(AppError::validation)?;
    }
    if let Some(color) = &input.color {
        validate_category_color(color).map_err(AppError::validation)?;
    }

    if CategoryRepo::find_by_id(&state.pool, id).await?.is_none() {
        return Err(category_not_found(id));
    }
    if let Some(name) = &input.name {
        ensure_name_available(&state.pool, name, Some(id)).await?;
    }

    let category = CategoryRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| category_not_found(id))?;

    tracing::info!(user_id = admin.user_id, category_id = id, "Category updated");

    Ok(Json(DataResponse { data: category }))
}

/// DELETE /api/v1/categories/{id}
///
/// Refused with 409 while live tickets reference the category.
pub async fn delete_category(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    match CategoryRepo::delete(&state.pool, id).await? {
        CategoryDeleteOutcome::Deleted => {
            tracing::info!(user_id = admin.user_id, category_id = id, "Category deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        CategoryDeleteOutcome::NotFound => Err(category_not_found(id)),
        CategoryDeleteOutcome::InUse(reference_count) => Err(AppError::Core(CoreError::InUse {
            entity: "Category",
            id,
            reference_count,
        })),
    }
}
