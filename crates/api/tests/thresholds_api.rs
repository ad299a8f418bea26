//! Tests for who may delete thresholds at each scope.

mod common;

use aquamon_core::roles::{ROLE_PROJECT_ADMIN, ROLE_SUPERADMIN, ROLE_USER};
use aquamon_core::types::DbId;
use axum::http::StatusCode;
use common::{body_json, delete_auth, post_json_auth, put_json_auth};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Farm {
    app: axum::Router,
    root_token: String,
    owner_token: String,
    project_id: DbId,
    device_id: DbId,
}

/// A superadmin, a project administered by a project admin, and one device.
async fn farm(pool: PgPool) -> Farm {
    let root = common::create_user(&pool, "root@farm.test", ROLE_SUPERADMIN).await;
    let owner = common::create_user(&pool, "owner@farm.test", ROLE_PROJECT_ADMIN).await;
    let root_token = common::token_for(root.id, ROLE_SUPERADMIN);
    let owner_token = common::token_for(owner.id, ROLE_PROJECT_ADMIN);
    let app = common::build_test_app(pool);

    let project = post_json_auth(
        app.clone(),
        "/api/v1/projects",
        serde_json::json!({ "name": "Nursery", "admin_id": owner.id }),
        &root_token,
    )
    .await;
    assert_eq!(project.status(), StatusCode::CREATED);
    let project_id = body_json(project).await["data"]["id"].as_i64().unwrap();

    let device = post_json_auth(
        app.clone(),
        "/api/v1/devices",
        serde_json::json!({
            "name": "Tank 2",
            "device_key": "NUR-002",
            "project_id": project_id,
            "sensor_types": ["pH"],
        }),
        &root_token,
    )
    .await;
    assert_eq!(device.status(), StatusCode::CREATED);
    let device_id = body_json(device).await["data"]["id"].as_i64().unwrap();

    Farm {
        app,
        root_token,
        owner_token,
        project_id,
        device_id,
    }
}

fn ph_threshold() -> serde_json::Value {
    serde_json::json!({
        "sensor_type": "pH",
        "ideal_min": 7.0, "ideal_max": 7.8,
        "warning_min": 6.6, "warning_max": 8.2,
        "critical_min": 6.2, "critical_max": 8.6,
        "unit": "pH",
    })
}

/// PUT a threshold and return the stored row's id.
async fn put_threshold(app: axum::Router, uri: &str, token: &str) -> DbId {
    let response = put_json_auth(app, uri, ph_threshold(), token).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

fn threshold_uri(id: DbId) -> String {
    format!("/api/v1/thresholds/{id}")
}

// ---------------------------------------------------------------------------
// Global defaults
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn project_admin_cannot_delete_global_default(pool: PgPool) {
    let f = farm(pool).await;
    let id = put_threshold(f.app.clone(), "/api/v1/thresholds/defaults", &f.root_token).await;

    let response = delete_auth(f.app.clone(), &threshold_uri(id), &f.owner_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(f.app, &threshold_uri(id), &f.root_token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn plain_user_cannot_delete_thresholds() {
    let app = common::build_test_app(common::unreachable_pool());
    let token = common::token_for(7, ROLE_USER);

    let response = delete_auth(app, &threshold_uri(1), &token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Overrides
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn project_admin_deletes_own_overrides(pool: PgPool) {
    let f = farm(pool).await;

    let uri = format!("/api/v1/thresholds/devices/{}", f.device_id);
    let device_override = put_threshold(f.app.clone(), &uri, &f.owner_token).await;
    let uri = format!("/api/v1/thresholds/projects/{}", f.project_id);
    let project_override = put_threshold(f.app.clone(), &uri, &f.owner_token).await;

    for id in [device_override, project_override] {
        let response = delete_auth(f.app.clone(), &threshold_uri(id), &f.owner_token).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    let response = delete_auth(f.app, &threshold_uri(device_override), &f.root_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn other_project_admin_cannot_delete_override(pool: PgPool) {
    let outsider = common::create_user(&pool, "other@farm.test", ROLE_PROJECT_ADMIN).await;
    let outsider_token = common::token_for(outsider.id, ROLE_PROJECT_ADMIN);
    let f = farm(pool).await;

    let uri = format!("/api/v1/thresholds/projects/{}", f.project_id);
    let id = put_threshold(f.app.clone(), &uri, &f.owner_token).await;

    let response = delete_auth(f.app, &threshold_uri(id), &outsider_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn override_of_deleted_device_is_superadmin_only(pool: PgPool) {
    let f = farm(pool).await;

    let uri = format!("/api/v1/thresholds/devices/{}", f.device_id);
    let id = put_threshold(f.app.clone(), &uri, &f.owner_token).await;

    let uri = format!("/api/v1/devices/{}", f.device_id);
    let response = delete_auth(f.app.clone(), &uri, &f.root_token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete_auth(f.app.clone(), &threshold_uri(id), &f.owner_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(f.app, &threshold_uri(id), &f.root_token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
