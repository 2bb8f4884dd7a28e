//! HTTP-level integration tests for the category directory.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, delete_auth, get_auth, post_json_auth, put_json_auth, seed_category,
    seed_user, token_for,
};
use helpdesk_core::roles::Role;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_creates_category_with_default_color(pool: PgPool) {
    let admin = seed_user(&pool, "admin@example.com", Role::Admin).await;
    let app = build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/v1/categories",
        &token_for(&admin),
        json!({ "name": "Billing", "description": "Invoices and refunds" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Billing");
    assert_eq!(json["data"]["color"], "#007bff");
    assert_eq!(json["data"]["is_active"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_non_admins_cannot_manage_categories(pool: PgPool) {
    let agent = seed_user(&pool, "agent@example.com", Role::Agent).await;
    let category = seed_category(&pool, "Hardware").await;
    let app = build_test_app(pool);
    let token = token_for(&agent);

    let create = post_json_auth(app.clone(), "/api/v1/categories", &token, json!({ "name": "New" })).await;
    assert_eq!(create.status(), StatusCode::FORBIDDEN);

    let delete = delete_auth(app, &format!("/api/v1/categories/{}", category.id), &token).await;
    assert_eq!(delete.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_name_conflicts(pool: PgPool) {
    let admin = seed_user(&pool, "admin@example.com", Role::Admin).await;
    seed_category(&pool, "Billing").await;
    let other = seed_category(&pool, "Hardware").await;
    let app = build_test_app(pool);
    let token = token_for(&admin);

    let create = post_json_auth(app.clone(), "/api/v1/categories", &token, json!({ "name": "Billing" })).await;
    assert_eq!(create.status(), StatusCode::CONFLICT);

    // A padded name is rejected rather than silently trimmed into a clash.
    let padded = post_json_auth(app.clone(), "/api/v1/categories", &token, json!({ "name": "Billing " })).await;
    assert_eq!(padded.status(), StatusCode::BAD_REQUEST);

    let rename = put_json_auth(
        app,
        &format!("/api/v1/categories/{}", other.id),
        &token,
        json!({ "name": "Billing" }),
    )
    .await;
    assert_eq!(rename.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_creates_yield_one_conflict(pool: PgPool) {
    let admin = seed_user(&pool, "admin@example.com", Role::Admin).await;
    let app = build_test_app(pool);
    let token = token_for(&admin);

    let (first, second) = tokio::join!(
        post_json_auth(app.clone(), "/api/v1/categories", &token, json!({ "name": "Billing" })),
        post_json_auth(app.clone(), "/api/v1/categories", &token, json!({ "name": "Billing" })),
    );

    let mut statuses = [first.status(), second.status()];
    statuses.sort_by_key(|s| s.as_u16());
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_color_is_rejected(pool: PgPool) {
    let admin = seed_user(&pool, "admin@example.com", Role::Admin).await;
    let app = build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/v1/categories",
        &token_for(&admin),
        json!({ "name": "Billing", "color": "blue" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_inactive_categories_are_admin_only(pool: PgPool) {
    let admin = seed_user(&pool, "admin@example.com", Role::Admin).await;
    let user = seed_user(&pool, "user@example.com", Role::User).await;
    let category = seed_category(&pool, "Legacy").await;
    seed_category(&pool, "Current").await;
    let app = build_test_app(pool);
    let uri = format!("/api/v1/categories/{}", category.id);

    let deactivate = put_json_auth(app.clone(), &uri, &token_for(&admin), json!({ "is_active": false })).await;
    assert_eq!(deactivate.status(), StatusCode::OK);

    let user_list = body_json(get_auth(app.clone(), "/api/v1/categories", &token_for(&user)).await).await;
    let names: Vec<&str> = user_list["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Current"]);

    let admin_list = body_json(get_auth(app.clone(), "/api/v1/categories", &token_for(&admin)).await).await;
    assert_eq!(admin_list["data"].as_array().unwrap().len(), 2);

    let user_get = get_auth(app.clone(), &uri, &token_for(&user)).await;
    assert_eq!(user_get.status(), StatusCode::NOT_FOUND);
    let admin_get = get_auth(app, &uri, &token_for(&admin)).await;
    assert_eq!(admin_get.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_reports_blocking_ticket_count(pool: PgPool) {
    let admin = seed_user(&pool, "admin@example.com", Role::Admin).await;
    let user = seed_user(&pool, "user@example.com", Role::User).await;
    let category = seed_category(&pool, "Network").await;
    let app = build_test_app(pool);
    let admin_token = token_for(&admin);
    let uri = format!("/api/v1/categories/{}", category.id);

    let mut ticket_ids = Vec::new();
    for subject in ["VPN", "Wifi"] {
        let response = post_json_auth(
            app.clone(),
            "/api/v1/tickets",
            &token_for(&user),
            json!({ "subject": subject, "description": "broken", "category_id": category.id }),
        )
        .await;
        ticket_ids.push(body_json(response).await["data"]["id"].as_i64().unwrap());
    }

    let blocked = delete_auth(app.clone(), &uri, &admin_token).await;
    assert_eq!(blocked.status(), StatusCode::CONFLICT);
    let json = body_json(blocked).await;
    assert_eq!(json["code"], "IN_USE");
    assert_eq!(json["reference_count"], 2);

    for id in ticket_ids {
        let response = delete_auth(app.clone(), &format!("/api/v1/tickets/{id}"), &admin_token).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    let deleted = delete_auth(app.clone(), &uri, &admin_token).await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let gone = get_auth(app, &uri, &admin_token).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}
