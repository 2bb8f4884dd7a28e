//! Route definitions for the `/tickets` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::tickets;
use crate::state::AppState;

/// Routes mounted at `/tickets`.
///
/// ```text
/// GET    /                -> list_tickets
/// POST   /                -> create_ticket
/// GET    /{id}            -> get_ticket
/// PUT    /{id}            -> update_ticket
/// DELETE /{id}            -> delete_ticket
/// POST   /{id}/comments   -> add_comment
/// POST   /{id}/vote       -> vote_ticket
/// POST   /{id}/assign     -> assign_ticket (agent/admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tickets::list_tickets).post(tickets::create_ticket))
        .route(
            "/{id}",
            get(tickets::get_ticket)
                .put(tickets::update_ticket)
                .delete(tickets::delete_ticket),
        )
        .route("/{id}/comments", post(tickets::add_comment))
        .route("/{id}/vote", post(tickets::vote_ticket))
        .route("/{id}/assign", post(tickets::assign_ticket))
}
