use std::sync::Arc;

use scn_core::service::NoticeService;
use scn_db::DbPool;
use scn_events::EventBus;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// The notice workflow, wired to Postgres or in-memory ports.
    pub service: NoticeService,
    /// Present only when running against PostgreSQL.
    pub pool: Option<DbPool>,
    pub config: Arc<ServerConfig>,
    /// Bus the service emits notice events on.
    pub event_bus: Arc<EventBus>,
}
