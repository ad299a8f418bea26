//! Integration tests for reading persistence and queries.
//!
//! Covers filtering, export, batch atomicity and retention of readings
//! after their device or project is removed.

use aquamon_db::models::device::CreateDevice;
use aquamon_db::models::project::CreateProject;
use aquamon_db::models::reading::{CreateReading, ReadingQuery};
use aquamon_db::models::user::CreateUser;
use aquamon_db::repositories::{DeviceRepo, ProjectRepo, ReadingRepo, UserRepo};
use sqlx::PgPool;

async fn seed_device(pool: &PgPool) -> (i64, i64) {
    let admin = UserRepo::create(
        pool,
        &CreateUser {
            name: "Admin".to_string(),
            email: "Admin@Farm.test".to_string(),
            password_hash: "x".to_string(),
            role: "projectadmin".to_string(),
        },
    )
    .await
    .unwrap();
    let project = ProjectRepo::create(
        pool,
        &CreateProject {
            name: "Hatchery".to_string(),
            description: None,
            location: Some("North".to_string()),
            admin_id: admin.id,
            api_key_hash: "h".to_string(),
            api_key_prefix: "p".to_string(),
        },
    )
    .await
    .unwrap();
    let device = DeviceRepo::create(
        pool,
        &CreateDevice {
            name: "Sonde".to_string(),
            device_key: "RAS-900".to_string(),
            project_id: project.id,
            description: None,
            location: None,
            sensor_types: vec!["pH".to_string()],
            status: None,
        },
    )
    .await
    .unwrap();
    (project.id, device.id)
}

fn reading(project_id: i64, device_id: i64, value: f64, level: &str) -> CreateReading {
    CreateReading {
        device_id,
        project_id,
        sensor_type: "pH".to_string(),
        value,
        unit: "pH".to_string(),
        is_alert: level != "normal",
        alert_level: level.to_string(),
        alert_message: None,
        recorded_at: None,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_filters_and_counts(pool: PgPool) {
    let (project_id, device_id) = seed_device(&pool).await;
    for (v, level) in [(7.5, "normal"), (9.2, "critical"), (8.6, "warning")] {
        ReadingRepo::create(&pool, &reading(project_id, device_id, v, level))
            .await
            .unwrap();
    }

    let alerts = ReadingQuery {
        alerts_only: Some(true),
        ..Default::default()
    };
    assert_eq!(ReadingRepo::count(&pool, &alerts).await.unwrap(), 2);
    assert_eq!(ReadingRepo::list(&pool, &alerts, 1, 0).await.unwrap().len(), 1);

    let nobody = ReadingQuery {
        accessible_projects: Some(vec![]),
        ..Default::default()
    };
    assert_eq!(ReadingRepo::count(&pool, &nobody).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_export_joins_names(pool: PgPool) {
    let (project_id, device_id) = seed_device(&pool).await;
    ReadingRepo::create(&pool, &reading(project_id, device_id, 7.1, "normal"))
        .await
        .unwrap();

    let rows = ReadingRepo::export(&pool, &ReadingQuery::default())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].project_name, "Hatchery");
    assert_eq!(rows[0].device_key, "RAS-900");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mark_seen_sets_online(pool: PgPool) {
    let (_, device_id) = seed_device(&pool).await;
    DeviceRepo::mark_seen(&pool, device_id).await.unwrap();

    let device = DeviceRepo::find_by_id(&pool, device_id).await.unwrap().unwrap();
    assert_eq!(device.status, "online");
    assert!(device.last_seen_at.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_email_lookup_is_case_insensitive(pool: PgPool) {
    seed_device(&pool).await;
    let user = UserRepo::find_by_email(&pool, "ADMIN@farm.TEST")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.email, "admin@farm.test");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleting_device_keeps_its_readings(pool: PgPool) {
    let (project_id, device_id) = seed_device(&pool).await;
    ReadingRepo::create(&pool, &reading(project_id, device_id, 9.4, "critical"))
        .await
        .unwrap();

    assert!(DeviceRepo::delete(&pool, device_id).await.unwrap());

    let by_device = ReadingQuery {
        device_id: Some(device_id),
        ..Default::default()
    };
    assert_eq!(ReadingRepo::count(&pool, &by_device).await.unwrap(), 1);

    // Export still lists the row, without device details.
    let rows = ReadingRepo::export(&pool, &by_device).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].project_name, "Hatchery");
    assert_eq!(rows[0].device_key, "");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleting_project_keeps_its_readings(pool: PgPool) {
    let (project_id, device_id) = seed_device(&pool).await;
    for v in [7.0, 7.2] {
        ReadingRepo::create(&pool, &reading(project_id, device_id, v, "normal"))
            .await
            .unwrap();
    }

    assert!(ProjectRepo::delete(&pool, project_id).await.unwrap());
    assert!(DeviceRepo::find_by_id(&pool, device_id).await.unwrap().is_none());

    let by_project = ReadingQuery {
        project_id: Some(project_id),
        ..Default::default()
    };
    assert_eq!(ReadingRepo::count(&pool, &by_project).await.unwrap(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_batch_insert_is_all_or_nothing(pool: PgPool) {
    let (project_id, device_id) = seed_device(&pool).await;

    let stored = ReadingRepo::create_batch(
        &pool,
        &[
            reading(project_id, device_id, 7.1, "normal"),
            reading(project_id, device_id, 9.3, "critical"),
        ],
    )
    .await
    .unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored[1].is_alert);

    // The second row breaks the alert_level check, so the first is rolled back.
    let result = ReadingRepo::create_batch(
        &pool,
        &[
            reading(project_id, device_id, 7.4, "normal"),
            reading(project_id, device_id, 7.5, "elevated"),
        ],
    )
    .await;
    assert!(result.is_err());
    assert_eq!(
        ReadingRepo::count(&pool, &ReadingQuery::default()).await.unwrap(),
        2
    );

    assert!(ReadingRepo::create_batch(&pool, &[]).await.unwrap().is_empty());
}
