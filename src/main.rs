use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use leadlab_api::config::Config;
use leadlab_api::db::connect_storage;
use leadlab_api::handlers::AppState;
use leadlab_api::router::build_router;
use leadlab_api::shutdown::shutdown_signal;

/// Main entry point for the application.
///
/// Loads configuration, initializes logging, opens the lead store, builds the router and
/// serves it until Ctrl+C or SIGTERM.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configuration first: it decides the default log filter
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.default_log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Starting {} v{} ({} environment)",
        config.app_name,
        config.api_version,
        config.environment
    );
    // Debug output redacts the secret key and database URL
    tracing::debug!("Configuration: {:?}", config);

    let storage = connect_storage(&config).await?;

    let port = config.port;
    let app_state = Arc::new(AppState::new(config, storage));
    let app = build_router(app_state)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Peer addresses feed the per-IP rate limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}
