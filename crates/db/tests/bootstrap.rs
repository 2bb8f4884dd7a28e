use helpdesk_core::roles::Role;
use helpdesk_core::status::{Lifecycle, TicketPriority, TicketStatus, VoteType};
use sqlx::PgPool;

/// Connect, migrate, and verify the lookup tables match the Rust enums.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    helpdesk_db::health_check(&pool).await.unwrap();

    let expected: [(&str, Vec<(i16, &str)>); 5] = [
        ("roles", Role::ALL.iter().map(|r| (r.id(), r.as_str())).collect()),
        ("ticket_statuses", TicketStatus::ALL.iter().map(|s| (s.id(), s.as_str())).collect()),
        ("ticket_priorities", TicketPriority::ALL.iter().map(|p| (p.id(), p.as_str())).collect()),
        ("vote_types", VoteType::ALL.iter().map(|v| (v.id(), v.as_str())).collect()),
        ("lifecycle_states", Lifecycle::ALL.iter().map(|l| (l.id(), l.as_str())).collect()),
    ];

    for (table, variants) in expected {
        let rows: Vec<(i16, String)> = sqlx::query_as(&format!("SELECT id, name FROM {table} ORDER BY id"))
            .fetch_all(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        let rows: Vec<(i16, &str)> = rows.iter().map(|(id, name)| (*id, name.as_str())).collect();
        assert_eq!(rows, variants, "{table} seed data should match the enum");
    }
}
