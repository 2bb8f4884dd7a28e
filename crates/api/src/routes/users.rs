//! Route definitions for the `/users` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET /          -> list_users (admin)
/// GET /agents    -> list_agents (agent/admin)
/// GET /{id}      -> get_user (self or admin)
/// PUT /{id}      -> update_user (self or admin)
/// DELETE /{id}   -> delete_user (admin, deactivates)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_users))
        .route("/agents", get(users::list_agents))
        .route(
            "/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
}
