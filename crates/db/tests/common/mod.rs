//! Seed helpers shared by the repository integration tests.

#![allow(dead_code)]

use helpdesk_core::roles::Role;
use helpdesk_core::status::{TicketPriority, VoteType};
use helpdesk_core::types::DbId;
use helpdesk_db::models::category::{Category, CreateCategory};
use helpdesk_db::models::ticket::{CreateTicket, Ticket};
use helpdesk_db::models::user::{CreateUser, User};
use helpdesk_db::repositories::{CategoryRepo, TicketRepo, UserRepo};
use sqlx::PgPool;

pub async fn seed_user(pool: &PgPool, email: &str, role: Role) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            first_name: "Test".to_string(),
            last_name: role.as_str().to_string(),
            role_id: role.id(),
        },
    )
    .await
    .expect("user insert should succeed")
}

pub async fn seed_category(pool: &PgPool, name: &str) -> Category {
    CategoryRepo::create(
        pool,
        &CreateCategory {
            name: name.to_string(),
            description: None,
            color: None,
        },
        "#007bff",
    )
    .await
    .expect("category insert should succeed")
}

pub async fn seed_ticket(pool: &PgPool, created_by: DbId, category_id: DbId, subject: &str) -> Ticket {
    TicketRepo::create(
        pool,
        created_by,
        &CreateTicket {
            subject: subject.to_string(),
            description: format!("{subject} description"),
            priority_id: None,
            category_id,
        },
        TicketPriority::default(),
    )
    .await
    .expect("ticket insert should succeed")
    .expect("category should be live")
}

/// Count stored vote rows of one type, independent of the cached counters.
pub async fn count_votes(pool: &PgPool, ticket_id: DbId, vote_type: VoteType) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM votes WHERE ticket_id = $1 AND vote_type_id = $2")
        .bind(ticket_id)
        .bind(vote_type.id())
        .fetch_one(pool)
        .await
        .expect("vote count should succeed")
}
