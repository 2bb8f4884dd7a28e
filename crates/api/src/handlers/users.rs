//! Handlers for the `/users` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use helpdesk_core::error::CoreError;
use helpdesk_core::roles::Role;
use helpdesk_core::types::DbId;
use helpdesk_db::models::user::{UpdateUser, UserListParams, UserResponse};
use helpdesk_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireStaff};
use crate::response::DataResponse;
use crate::state::AppState;

fn user_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "User", id })
}

fn ensure_self_or_admin(auth: &AuthUser, id: DbId) -> AppResult<()> {
    if auth.user_id != id && !auth.role.is_admin() {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only access your own account".into(),
        )));
    }
    Ok(())
}

/// GET /api/v1/users?role_id=
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<UserListParams>,
) -> AppResult<impl IntoResponse> {
    if let Some(role_id) = params.role_id {
        Role::try_from(role_id)?;
    }
    let users = UserRepo::list(&state.pool, params.role_id).await?;
    let data: Vec<UserResponse> = users.iter().map(UserResponse::from).collect();
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/users/agents
///
/// Active agents and admins, for the assignment picker.
pub async fn list_agents(
    RequireStaff(_staff): RequireStaff,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let users = UserRepo::list_assignable(&state.pool).await?;
    let data: Vec<UserResponse> = users.iter().map(UserResponse::from).collect();
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_self_or_admin(&auth, id)?;
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| user_not_found(id))?;
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// PUT /api/v1/users/{id}
///
/// Users may rename themselves. Role and activation changes are admin-only
/// and silently ignored for anyone else.
pub async fn update_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateUser>,
) -> AppResult<impl IntoResponse> {
    ensure_self_or_admin(&auth, id)?;

    if !auth.role.is_admin() {
        input.role_id = None;
        input.is_active = None;
    }
    if let Some(role_id) = input.role_id {
        Role::try_from(role_id)?;
    }
    if auth.user_id == id && input.is_active == Some(false) {
        return Err(AppError::BadRequest(
            "You cannot deactivate your own account".into(),
        ));
    }
    input.first_name = input.first_name.map(|n| n.trim().to_string());
    input.last_name = input.last_name.map(|n| n.trim().to_string());

    let user = UserRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| user_not_found(id))?;

    tracing::info!(
        user_id = auth.user_id,
        target_user_id = id,
        role = %user.role(),
        is_active = user.is_active,
        "User updated"
    );

    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// DELETE /api/v1/users/{id}
///
/// Soft delete: the account is deactivated and its tokens stop working.
pub async fn delete_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if admin.user_id == id {
        return Err(AppError::BadRequest(
            "You cannot deactivate your own account".into(),
        ));
    }
    if !UserRepo::deactivate(&state.pool, id).await? {
        return Err(user_not_found(id));
    }

    tracing::info!(user_id = admin.user_id, target_user_id = id, "User deactivated");
    Ok(StatusCode::NO_CONTENT)
}
