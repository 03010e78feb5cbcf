//! Fixline server binary.
//!
//! Wires the PostgreSQL adapters, the push gateway and the live rooms into
//! the HTTP and WebSocket routers, then serves until shutdown.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::middleware;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use fixline::adapters::http::booking::{booking_router, BookingAppState};
use fixline::adapters::http::chat::{chat_router, ChatAppState};
use fixline::adapters::http::middleware::{auth_middleware, AuthState, TokenVerifier};
use fixline::adapters::postgres::{
    PostgresBookingRepository, PostgresMessageStore, PostgresUserDirectory,
};
use fixline::adapters::push::HttpPushGateway;
use fixline::adapters::websocket::{websocket_router, ChatSocketState, UserRooms};
use fixline::application::handlers::chat::{MessageDispatcher, PresenceTracker};
use fixline::config::AppConfig;
use fixline::ports::{
    BookingRepository, MessageStore, NotificationGateway, RoomRouter, UserDirectory,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;
    tracing::info!("database pool ready");

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("migrations applied");
    }

    let bookings: Arc<dyn BookingRepository> =
        Arc::new(PostgresBookingRepository::new(pool.clone()));
    let store: Arc<dyn MessageStore> = Arc::new(PostgresMessageStore::new(pool.clone()));
    let users: Arc<dyn UserDirectory> = Arc::new(PostgresUserDirectory::new(pool));

    let rooms = Arc::new(UserRooms::with_default_capacity());
    let router: Arc<dyn RoomRouter> = rooms.clone();
    let gateway: Arc<dyn NotificationGateway> = Arc::new(HttpPushGateway::new(
        config.push.endpoint.clone(),
        config.push.api_key.clone(),
        config.push.timeout(),
        users.clone(),
    )?);
    let policy = config.push.delivery_policy();

    let dispatcher = Arc::new(MessageDispatcher::new(
        users.clone(),
        store.clone(),
        router.clone(),
        gateway.clone(),
        policy,
    ));
    let presence = Arc::new(PresenceTracker::new(router.clone()));

    let booking_state = BookingAppState {
        bookings,
        users: users.clone(),
        router: router.clone(),
        gateway: gateway.clone(),
        policy,
    };
    let chat_state = ChatAppState {
        users,
        store,
        router,
        gateway,
        policy,
    };
    let socket_state = ChatSocketState::new(rooms, dispatcher, presence);

    let verifier: AuthState = Arc::new(TokenVerifier::new(&config.auth.jwt_secret));

    let app = Router::new()
        .merge(booking_router().with_state(booking_state))
        .merge(chat_router().with_state(chat_state))
        .merge(websocket_router().with_state(socket_state))
        .layer(middleware::from_fn_with_state(verifier, auth_middleware))
        .layer(cors_layer(&config))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    let addr = config.server.socket_addr()?;
    tracing::info!(%addr, "fixline listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins_list()
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
