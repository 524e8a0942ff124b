use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, StatusCode};
use axum::Router;
use scn_core::memory::{MemoryNoticeStore, MemorySupplierRegistry};
use scn_core::ports::{NoticeStore, SupplierRegistry};
use scn_core::service::NoticeService;
use tokio::task::JoinHandle;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scn_api::config::ServerConfig;
use scn_api::{routes, state};

use state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scn_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Event bus ---
    let event_bus = Arc::new(scn_events::EventBus::new(config.event_bus_capacity));
    tracing::info!(capacity = config.event_bus_capacity, "Event bus created");

    // --- Storage ---
    let (pool, store, suppliers): (_, Arc<dyn NoticeStore>, Arc<dyn SupplierRegistry>) =
        match &config.database_url {
            Some(database_url) => {
                let pool = scn_db::create_pool(database_url)
                    .await
                    .expect("Failed to connect to database");
                tracing::info!("Database connection pool created");

                scn_db::health_check(&pool)
                    .await
                    .expect("Database health check failed");
                tracing::info!("Database health check passed");

                scn_db::run_migrations(&pool)
                    .await
                    .expect("Failed to run database migrations");
                tracing::info!("Database migrations applied");

                (
                    Some(pool.clone()),
                    Arc::new(scn_db::PgNoticeStore::new(pool.clone())),
                    Arc::new(scn_db::PgSupplierRegistry::new(pool)),
                )
            }
            None => {
                tracing::warn!(
                    suppliers = config.seed_suppliers.len(),
                    "DATABASE_URL not set, notices are kept in memory only"
                );
                (
                    None,
                    Arc::new(MemoryNoticeStore::new()),
                    Arc::new(MemorySupplierRegistry::new(config.seed_suppliers.clone())),
                )
            }
        };

    // --- Event services ---
    let persistence_handle: Option<JoinHandle<()>> = pool.clone().map(|pool| {
        tokio::spawn(scn_events::EventPersistence::run(
            pool,
            event_bus.subscribe(),
        ))
    });

    let topic_hub = Arc::new(scn_events::TopicHub::new());
    let dispatcher = scn_events::NotificationDispatcher::new(topic_hub);
    let dispatcher_handle = tokio::spawn(dispatcher.run(event_bus.subscribe()));

    tracing::info!(
        persistence = persistence_handle.is_some(),
        "Event services started"
    );

    // --- App state ---
    let service = NoticeService::new(store, suppliers, event_bus.clone());
    let state = AppState {
        service,
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
    };

    // --- CORS ---
    let cors = build_cors_layer(&config);

    // --- Request ID header name ---
    let request_id_header = HeaderName::from_static("x-request-id");

    // --- Router ---
    let app = Router::new()
        // Health check at root level (not under /api/v1).
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        // -- Middleware stack (applied bottom-up) --
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state);

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

    // The router (and the service inside it) is gone; dropping the last bus
    // handle closes the channel so the event services drain and exit.
    drop(event_bus);
    let drain = Duration::from_secs(config.shutdown_timeout_secs);
    if let Some(handle) = persistence_handle {
        let _ = tokio::time::timeout(drain, handle).await;
    }
    let _ = tokio::time::timeout(drain, dispatcher_handle).await;
    tracing::info!("Event services shut down");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM.
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

/// Build the CORS middleware layer from server configuration.
///
/// Panics at startup if any configured origin is invalid.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
