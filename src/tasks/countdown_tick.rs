//! Countdown tick background task

use std::{sync::Arc, time::Duration};
use chrono::Utc;
use tokio::{sync::watch, time::MissedTickBehavior};
use tracing::{debug, error, info};

use crate::state::AppState;

/// Recompute the card countdown every `period` until `shutdown` turns true.
///
/// Each tick also lets the backend finish timers whose deadline passed.
pub async fn countdown_tick_task(
    state: Arc<AppState>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    info!("Starting countdown tick task ({}ms)", period.as_millis());

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let now = Utc::now();

                for entity in state.backend.expire(now) {
                    if let Err(e) = state.apply_entity(entity) {
                        error!("Failed to apply finished timer: {}", e);
                    }
                }

                match state.tick(now.timestamp_millis()) {
                    Ok(card) => debug!("Tick: {} {}", card.status().name(), card.display()),
                    Err(e) => error!("Failed to update countdown: {}", e),
                }
            }

            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    info!("Stopping countdown tick task");
                    break;
                }
            }
        }
    }
}
