//! pos-cloud server binary

use std::net::SocketAddr;
use std::time::Duration;

use pos_cloud::api;
use pos_cloud::config::Config;
use pos_cloud::state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Housekeeping period: rate-limit windows, expired reset codes, empty rooms
const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pos_cloud=info,tower_http=info".into());
    if config.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!("Starting pos-cloud (env: {})", config.environment);

    let state = AppState::new(&config).await?;

    let app = api::create_router(state.clone()).layer(api::cors_layer(&config.cors_origins));

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("pos-cloud HTTP listening on {addr}");

    // Periodic cleanup (every 5 minutes)
    let housekeeping = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            housekeeping.rate_limiter.cleanup().await;
            housekeeping.live.prune();
            match pos_cloud::db::restaurants::purge_expired_reset_codes(&housekeeping.pool).await {
                Ok(0) => {}
                Ok(n) => tracing::debug!(purged = n, "Expired reset codes purged"),
                Err(e) => tracing::warn!(error = %e, "Reset code purge failed"),
            }
        }
    });

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("pos-cloud stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
