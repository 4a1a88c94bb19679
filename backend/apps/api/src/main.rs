//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod env;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use account::infra::http::{HttpBlobStore, HttpPaymentProvider};
use account::infra::lease::RedisIdentityLease;
use account::infra::postgres::{PgDocumentStore, PgIdentityRepository};
use account::infra::revoker::FabricRevoker;
use account::{AccountConfig, AccountDeps, AccountState, LivePorts, account_router};
use auth::{AuthConfig, AuthGateState, RedisSessionRepository, SignOutUseCase, auth_router};
use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
};
use platform::kv::SharedBackend;
use realtime::{FanoutRelay, RealtimeConfig, RealtimeState, RedisFanoutBus, realtime_router};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer, ExposeHeaders};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::env::ServerEnv;

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

/// Upper bound on one blob or payment provider call
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,auth=info,realtime=info,account=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let server_env = ServerEnv::from_env()?;

    // Relational store
    let pool = connect_pool(&server_env.database_url).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("../../../database/migrations")
        .set_ignore_missing(true)
        .run(&pool)
        .await?;

    // Derived documents, possibly the same database
    let document_pool = if server_env.document_database_url == server_env.database_url {
        pool.clone()
    } else {
        let document_pool = connect_pool(&server_env.document_database_url).await?;
        tracing::info!("Connected to document database");
        document_pool
    };

    sqlx::migrate!("../../../database/document_migrations")
        .set_ignore_missing(true)
        .run(&document_pool)
        .await?;

    tracing::info!("Migrations completed");

    // Shared session store and pub/sub bus
    let backend = SharedBackend::connect(&server_env.redis_url).await?;

    // Auth configuration
    let mut auth_config = match server_env.session_secret {
        Some(session_secret) => AuthConfig {
            session_secret,
            ..AuthConfig::default()
        },
        None => {
            tracing::warn!("SESSION_SECRET not set, using a random secret (sessions will not survive restarts)");
            AuthConfig::development()
        }
    };
    if let Some(ttl) = server_env.session_ttl {
        auth_config.session_ttl = ttl;
    }
    let auth_config = Arc::new(auth_config);

    let sessions = Arc::new(RedisSessionRepository::new(backend.connection.clone()));
    let identities = Arc::new(PgIdentityRepository::new(pool.clone()));
    let auth_state = AuthGateState::new(sessions.clone(), identities.clone(), auth_config.clone());

    // Realtime fanout
    let realtime_config = RealtimeConfig {
        fleet_member_id: server_env.fleet_member_id,
        allowed_origins: server_env.frontend_origins.clone(),
        ..RealtimeConfig::default()
    };
    let bus = RedisFanoutBus::new(backend.client.clone(), backend.connection.clone());
    let relay = FanoutRelay::new(Arc::new(bus), Arc::new(realtime_config));
    relay.spawn_subscriber().await?;

    tracing::info!(fleet_member_id = %server_env.fleet_member_id, "Fanout relay subscribed");

    // Account
    let mut account_config = AccountConfig::default();
    if let Some(lease) = server_env.deletion_lease {
        account_config.deletion_lease_ttl = lease;
    }

    let http = reqwest::Client::builder()
        .timeout(UPSTREAM_TIMEOUT)
        .build()?;

    let account_deps: AccountDeps<LivePorts> = AccountDeps {
        identities: identities.clone(),
        documents: Arc::new(PgDocumentStore::new(document_pool)),
        blobs: Arc::new(HttpBlobStore::new(
            http.clone(),
            server_env.blob_api_url.as_str(),
            server_env.blob_public_url.as_str(),
        )),
        payments: Arc::new(HttpPaymentProvider::new(
            http,
            server_env.payment_api_url.as_str(),
            server_env.payment_api_key.as_str(),
        )),
        revoker: Arc::new(FabricRevoker::new(SignOutUseCase::new(sessions), relay.clone())),
        lease: Arc::new(RedisIdentityLease::new(backend.connection.clone())),
        config: Arc::new(account_config),
    };

    // CORS configuration
    let allowed_origins: Vec<HeaderValue> = server_env
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let csrf_header = HeaderName::try_from(auth_config.csrf_header_name.as_str())?;

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::ACCEPT,
            csrf_header.clone(),
        ]))
        .expose_headers(ExposeHeaders::list([csrf_header]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest("/api/auth", auth_router(auth_state.clone()))
        .nest(
            "/api/realtime",
            realtime_router(RealtimeState {
                auth: auth_state.clone(),
                relay,
            }),
        )
        .nest(
            "/api/account",
            account_router(AccountState {
                auth: auth_state,
                deps: account_deps,
            }),
        )
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    tracing::info!("Listening on {}", server_env.bind_addr);

    let listener = TcpListener::bind(server_env.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn connect_pool(url: &str) -> anyhow::Result<PgPool> {
    Ok(PgPoolOptions::new()
        .max_connections(5)
        .connect(url)
        .await?)
}
