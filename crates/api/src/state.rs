use std::sync::Arc;

use aquamon_core::resolver::ThresholdResolver;
use aquamon_db::store::PgThresholdStore;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Threshold resolver backed by the database.
pub type Resolver = ThresholdResolver<PgThresholdStore>;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: aquamon_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (dashboard clients).
    pub ws_manager: Arc<WsManager>,
    /// In-process event bus for readings and audit entries.
    pub event_bus: Arc<aquamon_events::EventBus>,
    /// Threshold resolver used by ingest and the resolve preview.
    pub resolver: Arc<Resolver>,
}

impl AppState {
    /// Assemble state around a pool, building the resolver with the
    /// built-in fallback table.
    pub fn new(
        pool: aquamon_db::DbPool,
        config: ServerConfig,
        ws_manager: Arc<WsManager>,
        event_bus: Arc<aquamon_events::EventBus>,
    ) -> Self {
        let resolver = Arc::new(ThresholdResolver::with_builtin_defaults(
            PgThresholdStore::new(pool.clone()),
        ));
        Self {
            pool,
            config: Arc::new(config),
            ws_manager,
            event_bus,
            resolver,
        }
    }
}
