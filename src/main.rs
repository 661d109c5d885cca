//! Timer Card - host service for a countdown timer dashboard card

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use timer_card::{
    config::Config, server, services::LocalTimerBackend, signals::shutdown_signal,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("timer_card={},tower_http=info", config.log_level()))
        .init();

    info!("Starting timer-card server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, entity={}, tick={}ms",
        config.host, config.port, config.entity, config.tick_ms
    );

    let backend = LocalTimerBackend::new().with_entity(config.local_entity());
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        config.card_config(),
        Arc::new(backend),
    ));

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /card          - Card view");
    info!("  POST /card/duration - Enter a duration");
    info!("  POST /card/start    - Start the timer");
    info!("  POST /card/pause    - Pause the timer");
    info!("  POST /card/cancel   - Cancel the timer");
    info!("  GET  /card/config   - Card configuration");
    info!("  PUT  /card/config   - Change card configuration");
    info!("  GET  /status        - Card and server status");
    info!("  GET  /health        - Health check");

    server::serve(listener, state, config.tick_period(), shutdown_signal()).await?;

    info!("Server shutdown complete");
    Ok(())
}
