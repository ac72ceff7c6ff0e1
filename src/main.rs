use ironing_checkout::config::AppConfig;
use ironing_checkout::router::create_app_router;
use ironing_checkout::state::AppState;
use ironing_checkout::telemetry::init_tracing;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::from_env()?;
    init_tracing(config.log_format);

    // Initialize application state
    let state = Arc::new(AppState::from_config(&config).await?);
    info!(
        catalog_items = state.catalog.len(),
        fallback = state.catalog_warning.is_some(),
        payment_mode = ?config.payment_mode,
        "application state ready"
    );

    // Periodically drop paid and ended checkout sessions
    let sweeper = Arc::clone(&state);
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(60));
        loop {
            tick.tick().await;
            sweeper.evict_closed_sessions(chrono::Utc::now());
        }
    });

    // Build application router with all routes and middleware
    let app = create_app_router(state);

    // Configure the server address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(%addr, "server listening");

    // Start the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
