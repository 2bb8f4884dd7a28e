//! Integration tests for the category directory.

mod common;

use common::{seed_category, seed_ticket, seed_user};
use helpdesk_core::roles::Role;
use helpdesk_db::models::category::{CategoryDeleteOutcome, CreateCategory, UpdateCategory};
use helpdesk_db::repositories::{CategoryRepo, TicketRepo};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_reports_exact_reference_count(pool: PgPool) {
    let user = seed_user(&pool, "alice@example.com", Role::User).await;
    let category = seed_category(&pool, "Hardware").await;
    let first = seed_ticket(&pool, user.id, category.id, "Laptop").await;
    let second = seed_ticket(&pool, user.id, category.id, "Monitor").await;

    let outcome = CategoryRepo::delete(&pool, category.id).await.unwrap();
    assert_eq!(outcome, CategoryDeleteOutcome::InUse(2));

    TicketRepo::soft_delete(&pool, first.id).await.unwrap();
    assert_eq!(
        CategoryRepo::delete(&pool, category.id).await.unwrap(),
        CategoryDeleteOutcome::InUse(1)
    );

    TicketRepo::soft_delete(&pool, second.id).await.unwrap();
    assert_eq!(
        CategoryRepo::delete(&pool, category.id).await.unwrap(),
        CategoryDeleteOutcome::Deleted
    );
    assert!(CategoryRepo::find_by_id(&pool, category.id).await.unwrap().is_none());
    assert_eq!(
        CategoryRepo::delete(&pool, category.id).await.unwrap(),
        CategoryDeleteOutcome::NotFound
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleted_name_can_be_reused(pool: PgPool) {
    let old = seed_category(&pool, "Billing").await;
    CategoryRepo::delete(&pool, old.id).await.unwrap();

    assert!(!CategoryRepo::name_exists(&pool, "Billing", None).await.unwrap());
    let fresh = seed_category(&pool, "Billing").await;
    assert_ne!(fresh.id, old.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_duplicate_names_conflict(pool: PgPool) {
    let input = || CreateCategory {
        name: "Billing".to_string(),
        description: None,
        color: None,
    };
    let (a, b) = tokio::join!(
        async {
            let input = input();
            CategoryRepo::create(&pool, &input, "#007bff").await
        },
        async {
            let input = input();
            CategoryRepo::create(&pool, &input, "#007bff").await
        },
    );

    let results = [a, b];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let err = results
        .iter()
        .find_map(|r| r.as_ref().err())
        .expect("one insert should fail");
    let constraint = err.as_database_error().and_then(|e| e.constraint());
    assert_eq!(constraint, Some("uq_categories_name"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_inactive_categories_hidden_unless_requested(pool: PgPool) {
    let active = seed_category(&pool, "Network").await;
    let retired = seed_category(&pool, "Fax").await;
    CategoryRepo::update(
        &pool,
        retired.id,
        &UpdateCategory {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let visible = CategoryRepo::list(&pool, false).await.unwrap();
    assert_eq!(visible.iter().map(|c| c.id).collect::<Vec<_>>(), vec![active.id]);

    let all = CategoryRepo::list(&pool, true).await.unwrap();
    let names: Vec<_> = all.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Fax", "Network"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_name_exists_excludes_self(pool: PgPool) {
    let category = seed_category(&pool, "Access").await;
    assert!(CategoryRepo::name_exists(&pool, "Access", None).await.unwrap());
    assert!(!CategoryRepo::name_exists(&pool, "Access", Some(category.id)).await.unwrap());
}
