//! HTTP server run loop with graceful shutdown

use std::{future::Future, sync::Arc, time::Duration};
use tokio::{net::TcpListener, sync::watch};
use tracing::{error, info};

use crate::{
    api::create_router,
    state::AppState,
    tasks::{countdown_tick_task, entity_sync_task},
};

/// Serve the card API on `listener` until `signal` resolves.
///
/// The countdown tick and entity sync tasks run for as long as the server
/// does. Once `signal` fires, in-flight requests are drained and both tasks
/// are stopped and awaited before this returns.
pub async fn serve<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    tick_period: Duration,
    signal: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let tick = tokio::spawn(countdown_tick_task(
        Arc::clone(&state),
        tick_period,
        shutdown_rx.clone(),
    ));
    let sync = tokio::spawn(entity_sync_task(Arc::clone(&state), shutdown_rx));

    let stop_tasks = shutdown_tx.clone();
    let result = axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async move {
            signal.await;
            info!("Shutdown signal received, draining connections");
            let _ = stop_tasks.send(true);
        })
        .await;
    if let Err(e) = &result {
        error!("Server error: {}", e);
    }

    // Also stops the tasks when the server ended on its own
    let _ = shutdown_tx.send(true);
    for (name, handle) in [("countdown tick", tick), ("entity sync", sync)] {
        if let Err(e) = handle.await {
            error!("{} task failed: {}", name, e);
        }
    }

    result
}
