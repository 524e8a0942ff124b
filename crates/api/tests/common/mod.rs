#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use scn_api::auth::jwt::{generate_access_token, JwtConfig};
use scn_api::config::ServerConfig;
use scn_api::routes;
use scn_api::state::AppState;
use scn_core::capability::Actor;
use scn_core::memory::{MemoryNoticeStore, MemorySupplierRegistry};
use scn_core::notice::Supplier;
use scn_core::roles::Role;
use scn_core::service::NoticeService;
use scn_events::EventBus;
use serde_json::Value;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub const ACME: i64 = 100;
pub const BETA: i64 = 200;

/// Build a test `ServerConfig` with safe defaults and in-memory storage.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        event_bus_capacity: 64,
        database_url: None,
        seed_suppliers: vec![
            Supplier { id: ACME, name: "Acme Castings".into() },
            Supplier { id: BETA, name: "Beta Plastics".into() },
        ],
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router with all middleware layers on
/// in-memory stores.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack that production uses. The router is
/// `Clone` and every clone shares the same store.
pub fn build_test_app() -> Router {
    let config = test_config();
    let event_bus = Arc::new(EventBus::new(config.event_bus_capacity));
    let service = NoticeService::new(
        Arc::new(MemoryNoticeStore::new()),
        Arc::new(MemorySupplierRegistry::new(config.seed_suppliers.clone())),
        event_bus.clone(),
    );

    let state = AppState {
        service,
        pool: None,
        config: Arc::new(config),
        event_bus,
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Identities
// ---------------------------------------------------------------------------

pub fn sd() -> Actor {
    Actor {
        id: 1,
        display_name: "Sam SD".into(),
        role: Role::SD,
        supplier_id: None,
    }
}

pub fn manager() -> Actor {
    Actor {
        id: 2,
        display_name: "Mia Manager".into(),
        role: Role::Manager,
        supplier_id: None,
    }
}

pub fn supplier_user(supplier_id: i64) -> Actor {
    Actor {
        id: supplier_id / 10,
        display_name: format!("Supplier user {supplier_id}"),
        role: Role::Supplier,
        supplier_id: Some(supplier_id),
    }
}

pub fn token(actor: &Actor) -> String {
    generate_access_token(actor, &test_config().jwt).unwrap()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Send one request through a clone of `app`.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    actor: Option<&Actor>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(actor) = actor {
        builder = builder.header(AUTHORIZATION, format!("Bearer {}", token(actor)));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str, actor: &Actor) -> Response<Body> {
    send(app, Method::GET, uri, Some(actor), None).await
}

pub async fn post_json(app: &Router, uri: &str, actor: &Actor, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(actor), Some(body)).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a notice for `supplier_id` as SD and return its id.
pub async fn create_notice(app: &Router, supplier_id: i64) -> i64 {
    let response = post_json(
        app,
        "/api/v1/notices",
        &sd(),
        serde_json::json!({
            "category": "incoming_inspection",
            "supplier_id": supplier_id,
            "description": "Burrs on housing",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}
