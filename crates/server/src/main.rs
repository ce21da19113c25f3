//! Aerodict server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use aerodict_api::{AppState, auth_middleware, router as api_router, seo_router};
use aerodict_common::{Config, LocalStorage};
use anyhow::Context;
use axum::{Router, extract::DefaultBodyLimit, middleware};
use tokio::signal;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// Human-readable logs by default; `AERODICT_LOG_FORMAT=json` for JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "aerodict=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var("AERODICT_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting aerodict server...");

    let config = Config::load().context("loading configuration")?;

    // Database
    let db = aerodict_db::init(&config)
        .await
        .context("connecting to the database")?;
    info!("Connected to database");

    aerodict_db::migrate(&db)
        .await
        .context("running migrations")?;
    info!("Migrations completed");

    // Media storage
    tokio::fs::create_dir_all(&config.storage.media_root)
        .await
        .with_context(|| format!("creating {}", config.storage.media_root.display()))?;
    let storage = Arc::new(LocalStorage::new(
        config.storage.media_root.clone(),
        config.storage.media_url.clone(),
    ));

    let state = AppState::new(Arc::new(db), storage, config.server.url.clone());
    let body_limit = config.server.body_limit_mb.saturating_mul(1024 * 1024);

    let mut app = Router::new()
        .merge(seo_router())
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state);

    // Media is served from disk only when it lives under this site.
    let media_url = config.storage.media_url.trim_end_matches('/');
    if media_url.starts_with('/') && media_url.len() > 1 {
        app = app.nest_service(media_url, ServeDir::new(&config.storage.media_root));
    } else {
        warn!(media_url = %config.storage.media_url, "Media URL is not a local path; not serving media");
    }

    let app = app
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("parsing server.host and server.port")?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shutdown complete");
    Ok(())
}
