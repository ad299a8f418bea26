//! End-to-end tests for projects, devices, thresholds and reading ingest.

mod common;

use aquamon_core::roles::{ROLE_SUPERADMIN, ROLE_USER};
use aquamon_core::types::DbId;
use axum::http::StatusCode;
use common::{body_bytes, body_json, get_auth, ingest, post_json_auth, put_json_auth};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Fixture {
    app: axum::Router,
    admin_token: String,
    project_id: DbId,
    api_key: String,
    device_id: DbId,
}

/// Superadmin, one project with its key, one device reporting pH and
/// temperature under key `IUB002`.
async fn fixture(pool: PgPool) -> Fixture {
    let admin = common::create_user(&pool, "root@farm.test", ROLE_SUPERADMIN).await;
    let admin_token = common::token_for(admin.id, ROLE_SUPERADMIN);
    let app = common::build_test_app(pool);

    let project = post_json_auth(
        app.clone(),
        "/api/v1/projects",
        serde_json::json!({ "name": "Grow-out", "location": "Hall B" }),
        &admin_token,
    )
    .await;
    assert_eq!(project.status(), StatusCode::CREATED);
    let project = body_json(project).await;
    let project_id = project["data"]["id"].as_i64().unwrap();
    let api_key = project["data"]["api_key"].as_str().unwrap().to_string();
    assert!(project["data"].get("api_key_hash").is_none());

    let device = post_json_auth(
        app.clone(),
        "/api/v1/devices",
        serde_json::json!({
            "name": "Tank 4 sonde",
            "device_key": "IUB002",
            "project_id": project_id,
            "sensor_types": ["pH", "temperature"],
        }),
        &admin_token,
    )
    .await;
    assert_eq!(device.status(), StatusCode::CREATED);
    let device_id = body_json(device).await["data"]["id"].as_i64().unwrap();

    Fixture {
        app,
        admin_token,
        project_id,
        api_key,
        device_id,
    }
}

fn readings(device_key: &str, items: serde_json::Value) -> serde_json::Value {
    serde_json::json!({ "deviceId": device_key, "readings": items })
}

// ---------------------------------------------------------------------------
// Ingest
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn ingest_classifies_and_skips_unregistered_types(pool: PgPool) {
    let f = fixture(pool).await;

    let body = readings(
        "IUB002",
        serde_json::json!([
            { "sensorType": "pH", "value": 9.2 },
            { "sensorType": "temperature", "value": 25.0 },
            { "sensorType": "tds", "value": 250.0 },
        ]),
    );
    let response = ingest(f.app, &f.api_key, body).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["count"], 2);

    let ph = &json["data"][0];
    assert_eq!(ph["sensor_type"], "pH");
    assert_eq!(ph["is_alert"], true);
    assert_eq!(ph["alert_level"], "critical");
    assert_eq!(ph["alert_message"], "Critical high pH: 9.2 pH (above 9 pH)");
    assert_eq!(ph["unit"], "pH");

    let temp = &json["data"][1];
    assert_eq!(temp["alert_level"], "normal");
    assert_eq!(temp["is_alert"], false);
    assert!(temp["alert_message"].is_null());
    assert_eq!(temp["unit"], "°C");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn ingest_with_unknown_key_is_401(pool: PgPool) {
    let f = fixture(pool).await;

    let body = readings("IUB002", serde_json::json!([{ "sensorType": "pH", "value": 7.4 }]));
    let response = ingest(f.app, "rk_not_a_real_key", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Invalid API key");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn ingest_for_unknown_device_is_404(pool: PgPool) {
    let f = fixture(pool).await;

    let body = readings("NOPE-1", serde_json::json!([{ "sensorType": "pH", "value": 7.4 }]));
    let response = ingest(f.app, &f.api_key, body).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn ingest_with_empty_readings_is_400(pool: PgPool) {
    let f = fixture(pool).await;

    let response = ingest(f.app, &f.api_key, readings("IUB002", serde_json::json!([]))).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Threshold overrides
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn project_override_changes_classification(pool: PgPool) {
    let f = fixture(pool).await;

    let tight_ph = serde_json::json!({
        "sensor_type": "pH",
        "ideal_min": 7.2, "ideal_max": 7.6,
        "warning_min": 7.0, "warning_max": 7.8,
        "critical_min": 6.8, "critical_max": 8.0,
        "unit": "pH",
    });
    let uri = format!("/api/v1/thresholds/projects/{}", f.project_id);
    let response = put_json_auth(f.app.clone(), &uri, tight_ph, &f.admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let uri = format!(
        "/api/v1/thresholds/resolve?sensor_type=pH&device_id={}",
        f.device_id
    );
    let resolved = body_json(get_auth(f.app.clone(), &uri, &f.admin_token).await).await;
    assert_eq!(resolved["data"]["source"], "project");
    assert_eq!(resolved["data"]["critical_max"], 8.0);

    // 7.9 is normal under the factory default but a warning here.
    let body = readings("IUB002", serde_json::json!([{ "sensorType": "pH", "value": 7.9 }]));
    let json = body_json(ingest(f.app, &f.api_key, body).await).await;
    assert_eq!(json["data"][0]["alert_level"], "warning");
    assert_eq!(
        json["data"][0]["alert_message"],
        "Warning high pH: 7.9 pH (above 7.8 pH)"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unnested_threshold_is_rejected(pool: PgPool) {
    let f = fixture(pool).await;

    let broken = serde_json::json!({
        "sensor_type": "pH",
        "ideal_min": 7.0, "ideal_max": 8.0,
        "warning_min": 5.0, "warning_max": 8.5,
        "critical_min": 6.0, "critical_max": 9.0,
        "unit": "pH",
    });
    let uri = format!("/api/v1/thresholds/devices/{}", f.device_id);
    let response = put_json_auth(f.app, &uri, broken, &f.admin_token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn resolve_unknown_type_falls_back_to_generic(pool: PgPool) {
    let f = fixture(pool).await;

    let resolved = body_json(
        get_auth(
            f.app,
            "/api/v1/thresholds/resolve?sensor_type=ammonia",
            &f.admin_token,
        )
        .await,
    )
    .await;

    assert_eq!(resolved["data"]["source"], "generic");
    assert_eq!(resolved["data"]["critical_min"], 0.0);
    assert_eq!(resolved["data"]["critical_max"], 100.0);
    assert_eq!(resolved["data"]["unit"], "");
}

// ---------------------------------------------------------------------------
// Queries and access
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_and_export_return_ingested_readings(pool: PgPool) {
    let f = fixture(pool).await;

    let body = readings(
        "IUB002",
        serde_json::json!([
            { "sensorType": "pH", "value": 5.5 },
            { "sensorType": "temperature", "value": 26.0 },
        ]),
    );
    assert_eq!(
        ingest(f.app.clone(), &f.api_key, body).await.status(),
        StatusCode::CREATED
    );

    let uri = format!("/api/v1/sensor-data?project_id={}&alerts_only=true", f.project_id);
    let page = body_json(get_auth(f.app.clone(), &uri, &f.admin_token).await).await;
    assert_eq!(page["total_count"], 1);
    assert_eq!(page["current_page"], 1);
    assert_eq!(page["data"][0]["alert_level"], "critical");

    let recent = body_json(
        get_auth(f.app.clone(), "/api/v1/sensor-data/recent?limit=5", &f.admin_token).await,
    )
    .await;
    assert_eq!(recent["data"].as_array().unwrap().len(), 2);

    let export = get_auth(
        f.app,
        &format!("/api/v1/sensor-data/export?project_id={}", f.project_id),
        &f.admin_token,
    )
    .await;
    assert_eq!(export.status(), StatusCode::OK);
    let disposition = export.headers()["content-disposition"].to_str().unwrap().to_string();
    assert!(disposition.contains("sensor_data_export_"));

    let csv = String::from_utf8(body_bytes(export).await).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("Timestamp,Project,Device,DeviceID,SensorType,Value,Unit,Alert")
    );
    assert_eq!(lines.count(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn non_member_cannot_read_project_data(pool: PgPool) {
    let outsider = common::create_user(&pool, "visitor@farm.test", ROLE_USER).await;
    let f = fixture(pool).await;
    let token = common::token_for(outsider.id, ROLE_USER);

    let project = get_auth(
        f.app.clone(),
        &format!("/api/v1/projects/{}", f.project_id),
        &token,
    )
    .await;
    assert_eq!(project.status(), StatusCode::FORBIDDEN);

    let data = get_auth(
        f.app.clone(),
        &format!("/api/v1/sensor-data?project_id={}", f.project_id),
        &token,
    )
    .await;
    assert_eq!(data.status(), StatusCode::FORBIDDEN);

    // Unscoped queries are narrowed to the caller's projects, which is none.
    let list = body_json(get_auth(f.app, "/api/v1/projects", &token).await).await;
    assert!(list["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn member_sees_project_after_being_added(pool: PgPool) {
    let member = common::create_user(&pool, "keeper@farm.test", ROLE_USER).await;
    let f = fixture(pool).await;

    let added = post_json_auth(
        f.app.clone(),
        &format!("/api/v1/projects/{}/members", f.project_id),
        serde_json::json!({ "user_id": member.id }),
        &f.admin_token,
    )
    .await;
    assert_eq!(added.status(), StatusCode::CREATED);

    let token = common::token_for(member.id, ROLE_USER);
    let detail = get_auth(f.app, &format!("/api/v1/projects/{}", f.project_id), &token).await;
    assert_eq!(detail.status(), StatusCode::OK);
    let json = body_json(detail).await;
    assert_eq!(json["data"]["members"][0]["email"], "keeper@farm.test");
}
