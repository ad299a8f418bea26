use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use aquamon_api::config::ServerConfig;
use aquamon_api::notifications::ReadingBroadcaster;
use aquamon_api::router::build_app_router;
use aquamon_api::state::AppState;
use aquamon_api::ws;
use aquamon_core::threshold::FallbackTable;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aquamon_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = aquamon_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    aquamon_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    aquamon_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    if config.seed_default_thresholds {
        aquamon_db::seed::seed_default_thresholds(&pool, &FallbackTable::builtin())
            .await
            .expect("Failed to seed default thresholds");
    }

    // --- WebSocket manager + heartbeat ---
    let ws_manager = Arc::new(ws::WsManager::new());
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&ws_manager));

    // --- Event bus ---
    let event_bus = Arc::new(aquamon_events::EventBus::default());

    let audit_handle = tokio::spawn(aquamon_events::AuditWriter::run(
        pool.clone(),
        event_bus.subscribe(),
    ));
    let broadcaster = ReadingBroadcaster::new(Arc::clone(&ws_manager));
    let broadcaster_handle = tokio::spawn(broadcaster.run(event_bus.subscribe()));
    tracing::info!("Event services started (audit writer, reading broadcaster)");

    // --- App state + router ---
    let state = AppState::new(
        pool,
        config.clone(),
        Arc::clone(&ws_manager),
        Arc::clone(&event_bus),
    );
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // Upgraded WebSocket tasks outlive `serve` and each holds a state clone
    // of the bus. Closing them first lets the last bus handle go below.
    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    ws_manager.shutdown_all().await;
    heartbeat_handle.abort();

    let drain = Duration::from_secs(config.shutdown_timeout_secs);
    drop(event_bus);
    let _ = tokio::time::timeout(drain, audit_handle).await;
    let _ = tokio::time::timeout(drain, broadcaster_handle).await;
    tracing::info!("Event services shut down");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
