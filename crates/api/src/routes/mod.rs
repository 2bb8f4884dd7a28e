pub mod auth;
pub mod categories;
pub mod health;
pub mod tickets;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                     register (public)
/// /auth/login                        login (public)
/// /auth/me                           current user
///
/// /tickets                           list, create
/// /tickets/{id}                      get, update, delete
/// /tickets/{id}/comments             add comment (POST)
/// /tickets/{id}/vote                 cast vote (POST)
/// /tickets/{id}/assign               assign (POST, agent/admin)
///
/// /categories                        list, create (create: admin)
/// /categories/{id}                   get, update, delete (update/delete: admin)
///
/// /users                             list (admin)
/// /users/agents                      assignable users (agent/admin)
/// /users/{id}                        get, update (self or admin), delete (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/tickets", tickets::router())
        .nest("/categories", categories::router())
        .nest("/users", users::router())
}
