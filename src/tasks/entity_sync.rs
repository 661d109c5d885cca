//! Entity sync background task

use std::sync::Arc;
use tokio::sync::{broadcast::error::RecvError, watch};
use tracing::{error, info, warn};

use crate::state::AppState;

/// Apply entity records pushed by the backend to the card
pub async fn entity_sync_task(state: Arc<AppState>, mut shutdown: watch::Receiver<bool>) {
    info!("Starting entity sync task");

    let mut updates = state.backend.subscribe();

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(entity) => {
                    if let Err(e) = state.apply_entity(entity) {
                        error!("Failed to apply entity update: {}", e);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Missed {} entity updates, reloading from backend", skipped);
                    if let Err(e) = state.resync_entity() {
                        error!("Failed to reload entity: {}", e);
                    }
                }
                Err(RecvError::Closed) => {
                    info!("Backend update channel closed");
                    break;
                }
            },

            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    info!("Stopping entity sync task");
                    break;
                }
            }
        }
    }
}
