//! Handlers for the `/tickets` resource and its comments, votes and
//! assignment.
//!
//! Every handler that targets one ticket follows the same order: load the
//! live ticket (404), ask `helpdesk_core::access::authorize` (403), validate
//! input (400), mutate, then publish the lifecycle event.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use helpdesk_core::access::{
    authorize, can_view_internal_comments, effective_internal_flag, is_assignable_role, list_scope,
    TicketAction, TicketFieldMask, TicketOwnership,
};
use helpdesk_core::comments::validate_comment_content;
use helpdesk_core::error::CoreError;
use helpdesk_core::event_types::{
    EVENT_TICKET_ASSIGNED, EVENT_TICKET_COMMENT_ADDED, EVENT_TICKET_CREATED, EVENT_TICKET_UPDATED,
};
use helpdesk_core::status::{priority_or_default, TicketPriority, TicketStatus};
use helpdesk_core::tickets::{
    like_pattern, normalize_text_patch, validate_description, validate_subject, PageRequest,
    TicketChanges, TicketSort,
};
use helpdesk_core::types::DbId;
use helpdesk_db::models::comment::CreateComment;
use helpdesk_db::models::ticket::{
    AssignTicket, CreateTicket, Ticket, TicketDetail, TicketFilter, TicketListParams, UpdateTicket,
};
use helpdesk_db::models::vote::CastVote;
use helpdesk_db::repositories::{CommentRepo, TicketRepo, UserRepo, VoteRepo};
use helpdesk_db::DbPool;
use helpdesk_events::PlatformEvent;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, Page};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ticket_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Ticket", id })
}

/// Load a live ticket or fail with 404.
async fn load_ticket(pool: &DbPool, id: DbId) -> AppResult<Ticket> {
    TicketRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ticket_not_found(id))
}

fn ownership(ticket: &Ticket) -> TicketOwnership {
    TicketOwnership {
        created_by: ticket.created_by,
    }
}

/// The assignee must be an active agent or admin.
async fn ensure_assignable(pool: &DbPool, user_id: DbId) -> AppResult<()> {
    let assignable = UserRepo::find_by_id(pool, user_id)
        .await?
        .is_some_and(|user| user.is_active && is_assignable_role(user.role()));
    if !assignable {
        return Err(AppError::Core(CoreError::InvalidReference(format!(
            "User {user_id} cannot be assigned tickets"
        ))));
    }
    Ok(())
}

/// Payload fields the notification router needs to resolve recipients.
fn event_payload(ticket: &Ticket) -> serde_json::Value {
    json!({
        "subject": ticket.subject,
        "created_by": ticket.created_by,
        "assigned_to_id": ticket.assigned_to_id,
        "status_id": ticket.status_id,
        "priority_id": ticket.priority_id,
    })
}

/// Validate the permitted part of an update request.
///
/// Fields outside `mask` are dropped before validation, so a user sending a
/// staff-only field is not rejected for its value.
fn build_changes(input: UpdateTicket, mask: TicketFieldMask) -> AppResult<TicketChanges> {
    let subject = normalize_text_patch(input.subject).filter(|_| mask.subject);
    if let Some(subject) = &subject {
        validate_subject(subject).map_err(AppError::validation)?;
    }

    let description = normalize_text_patch(input.description).filter(|_| mask.description);
    if let Some(description) = &description {
        validate_description(description).map_err(AppError::validation)?;
    }

    let status = input
        .status_id
        .filter(|_| mask.status)
        .map(TicketStatus::try_from)
        .transpose()?;
    let priority = input
        .priority_id
        .filter(|_| mask.priority)
        .map(TicketPriority::try_from)
        .transpose()?;

    Ok(TicketChanges {
        subject: subject.map(|s| s.trim().to_string()),
        description,
        status,
        priority,
        assigned_to: input.assigned_to_id.filter(|_| mask.assigned_to),
    }
    .masked(mask))
}

// ---------------------------------------------------------------------------
// Ticket handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/tickets?status_id=&category_id=&assigned_to=&created_by=&search=&sort_by=&sort_order=&page=&page_size=
///
/// Users only ever see their own tickets, whatever filters they pass.
pub async fn list_tickets(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<TicketListParams>,
) -> AppResult<impl IntoResponse> {
    let principal = auth.principal();

    if let Some(status_id) = params.status_id {
        TicketStatus::try_from(status_id)?;
    }

    let filter = TicketFilter {
        status_id: params.status_id,
        category_id: params.category_id,
        assigned_to: params.assigned_to,
        created_by: params.created_by,
        owner_scope: list_scope(&principal),
        search_pattern: params.search.as_deref().and_then(like_pattern),
        include_internal: can_view_internal_comments(&principal),
    };
    let sort = TicketSort::resolve(params.sort_by.as_deref(), params.sort_order.as_deref());
    let page = PageRequest::resolve(params.page, params.page_size);

    let (items, total) = TicketRepo::list(&state.pool, &filter, sort, page).await?;

    Ok(Json(DataResponse {
        data: Page::new(items, total, page),
    }))
}

/// POST /api/v1/tickets
pub async fn create_ticket(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(mut input): Json<CreateTicket>,
) -> AppResult<impl IntoResponse> {
    validate_subject(&input.subject).map_err(AppError::validation)?;
    validate_description(&input.description).map_err(AppError::validation)?;
    let priority = priority_or_default(input.priority_id)?;
    input.subject = input.subject.trim().to_string();

    let ticket = TicketRepo::create(&state.pool, auth.user_id, &input, priority)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::InvalidReference(format!(
                "Category {} does not exist",
                input.category_id
            )))
        })?;

    tracing::info!(
        user_id = auth.user_id,
        ticket_id = ticket.id,
        category_id = ticket.category_id,
        "Ticket created"
    );

    state.event_bus.publish(
        PlatformEvent::ticket(EVENT_TICKET_CREATED, ticket.id, auth.user_id)
            .with_payload(event_payload(&ticket)),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: ticket })))
}

/// GET /api/v1/tickets/{id}
///
/// Returns the ticket with its visible comments and the caller's vote.
/// Each successful call counts as one view.
pub async fn get_ticket(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let principal = auth.principal();
    let ticket = load_ticket(&state.pool, id).await?;
    authorize(&principal, TicketAction::View, &ownership(&ticket)).require()?;

    let ticket = TicketRepo::record_view(&state.pool, id)
        .await?
        .ok_or_else(|| ticket_not_found(id))?;
    let comments =
        CommentRepo::list_for_ticket(&state.pool, id, can_view_internal_comments(&principal))
            .await?;
    let viewer_vote = VoteRepo::find_user_vote(&state.pool, id, auth.user_id).await?;

    Ok(Json(DataResponse {
        data: TicketDetail {
            ticket,
            comments,
            viewer_vote,
        },
    }))
}

/// PUT /api/v1/tickets/{id}
///
/// Creators may edit subject and description; staff may edit everything.
/// Fields the caller may not change are ignored.
pub async fn update_ticket(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTicket>,
) -> AppResult<impl IntoResponse> {
    let ticket = load_ticket(&state.pool, id).await?;
    let mask = authorize(&auth.principal(), TicketAction::Update, &ownership(&ticket)).into_mask()?;

    let changes = build_changes(input, mask)?;
    if let Some(Some(assignee_id)) = changes.assigned_to {
        ensure_assignable(&state.pool, assignee_id).await?;
    }

    if changes.is_empty() {
        return Ok(Json(DataResponse { data: ticket }));
    }

    let updated = TicketRepo::update(&state.pool, id, &changes)
        .await?
        .ok_or_else(|| ticket_not_found(id))?;

    let changed_fields = changes.changed_fields();
    tracing::info!(
        user_id = auth.user_id,
        ticket_id = id,
        fields = ?changed_fields,
        "Ticket updated"
    );

    let mut payload = event_payload(&updated);
    payload["changed_fields"] = json!(changed_fields);
    state.event_bus.publish(
        PlatformEvent::ticket(EVENT_TICKET_UPDATED, id, auth.user_id).with_payload(payload),
    );

    if let Some(assignee_id) = updated.assigned_to_id {
        if ticket.assigned_to_id != Some(assignee_id) {
            state.event_bus.publish(
                PlatformEvent::ticket(EVENT_TICKET_ASSIGNED, id, auth.user_id)
                    .with_payload(event_payload(&updated)),
            );
        }
    }

    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/tickets/{id}
///
/// Soft delete; the ticket's comments go with it.
pub async fn delete_ticket(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let ticket = load_ticket(&state.pool, id).await?;
    authorize(&auth.principal(), TicketAction::Delete, &ownership(&ticket)).require()?;

    if !TicketRepo::soft_delete(&state.pool, id).await? {
        return Err(ticket_not_found(id));
    }

    tracing::info!(user_id = auth.user_id, ticket_id = id, "Ticket deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/tickets/{id}/assign
///
/// Sets the assignee and moves the ticket to `in_progress`.
pub async fn assign_ticket(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AssignTicket>,
) -> AppResult<impl IntoResponse> {
    let ticket = load_ticket(&state.pool, id).await?;
    authorize(&auth.principal(), TicketAction::Assign, &ownership(&ticket)).require()?;
    ensure_assignable(&state.pool, input.assigned_to_id).await?;

    let updated = TicketRepo::assign(&state.pool, id, input.assigned_to_id)
        .await?
        .ok_or_else(|| ticket_not_found(id))?;

    tracing::info!(
        user_id = auth.user_id,
        ticket_id = id,
        assignee_id = input.assigned_to_id,
        "Ticket assigned"
    );

    state.event_bus.publish(
        PlatformEvent::ticket(EVENT_TICKET_ASSIGNED, id, auth.user_id)
            .with_payload(event_payload(&updated)),
    );

    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// Comments and votes
// ---------------------------------------------------------------------------

/// POST /api/v1/tickets/{id}/comments
///
/// `is_internal` is only honoured for agents and admins.
pub async fn add_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateComment>,
) -> AppResult<impl IntoResponse> {
    let principal = auth.principal();
    let ticket = load_ticket(&state.pool, id).await?;
    authorize(&principal, TicketAction::Comment, &ownership(&ticket)).require()?;
    validate_comment_content(&input.content).map_err(AppError::validation)?;

    let is_internal = effective_internal_flag(&principal, input.is_internal);
    let comment = CommentRepo::create(&state.pool, id, auth.user_id, &input.content, is_internal)
        .await?
        .ok_or_else(|| ticket_not_found(id))?;

    tracing::info!(
        user_id = auth.user_id,
        ticket_id = id,
        comment_id = comment.id,
        is_internal,
        "Comment added"
    );

    let mut payload = event_payload(&ticket);
    payload["comment_id"] = json!(comment.id);
    payload["is_internal"] = json!(is_internal);
    payload["content"] = json!(comment.content);
    state.event_bus.publish(
        PlatformEvent::ticket(EVENT_TICKET_COMMENT_ADDED, id, auth.user_id).with_payload(payload),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: comment })))
}

/// POST /api/v1/tickets/{id}/vote
///
/// One vote per user per ticket; voting again with the same type is a no-op
/// and voting with the other type switches the vote.
pub async fn vote_ticket(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CastVote>,
) -> AppResult<impl IntoResponse> {
    let ticket = load_ticket(&state.pool, id).await?;
    authorize(&auth.principal(), TicketAction::Vote, &ownership(&ticket)).require()?;

    let result = VoteRepo::cast(&state.pool, id, auth.user_id, input.vote_type)
        .await?
        .ok_or_else(|| ticket_not_found(id))?;

    tracing::info!(
        user_id = auth.user_id,
        ticket_id = id,
        vote_type = %input.vote_type,
        outcome = ?result.outcome,
        "Vote cast"
    );

    Ok(Json(DataResponse { data: result }))
}
