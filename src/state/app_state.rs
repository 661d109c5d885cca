//! Shared host state

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

use super::{CardConfig, CardState, CardView, TimerEntity};
use crate::{
    duration::DurationField,
    services::{BackendError, ServiceCall, TimerBackend, TimerService},
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to lock {0}")]
    Lock(&'static str),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// State shared by the HTTP handlers and the background tasks
pub struct AppState {
    /// Current card display state
    card: Mutex<CardState>,
    /// Automation backend the card talks to
    pub backend: Arc<dyn TimerBackend>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    last_action: Mutex<Option<String>>,
    last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Every new card view is published here
    view_tx: watch::Sender<CardView>,
}

impl AppState {
    /// Create the state and load the configured entity from the backend
    pub fn new(
        port: u16,
        host: String,
        config: CardConfig,
        backend: Arc<dyn TimerBackend>,
    ) -> Self {
        let card = CardState::new(config);
        let card = card.apply_entity(backend.entity(card.entity_id()));
        let (view_tx, _) = watch::channel(card.view());

        Self {
            card: Mutex::new(card),
            backend,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            view_tx,
        }
    }

    /// Replace the card with `updater(current)` and publish the new view
    pub fn update_card<F>(&self, updater: F) -> Result<CardState, AppError>
    where
        F: FnOnce(&CardState) -> CardState,
    {
        let mut card = self.card.lock().map_err(|_| AppError::Lock("card state"))?;
        let next = updater(&*card);
        *card = next.clone();
        drop(card);

        self.view_tx.send_replace(next.view());
        Ok(next)
    }

    pub fn card(&self) -> Result<CardState, AppError> {
        self.card
            .lock()
            .map(|card| card.clone())
            .map_err(|_| AppError::Lock("card state"))
    }

    pub fn view(&self) -> Result<CardView, AppError> {
        self.card().map(|card| card.view())
    }

    /// Watch card views as they change
    pub fn subscribe_view(&self) -> watch::Receiver<CardView> {
        self.view_tx.subscribe()
    }

    /// Apply an edited card configuration and reload the entity
    pub fn set_config(&self, config: CardConfig) -> Result<CardState, AppError> {
        info!("Card configuration changed: entity={}, header={:?}", config.entity, config.header);
        self.update_card(|card| card.with_config(config))?;
        self.resync_entity()
    }

    pub fn apply_duration_text(&self, text: &str) -> Result<CardState, AppError> {
        debug!("Duration input: {:?}", text);
        self.update_card(|card| card.apply_duration_text(text))
    }

    /// Set one duration input field from user text
    pub fn apply_field(&self, field: DurationField, text: &str) -> Result<CardState, AppError> {
        debug!("{} input: {:?}", field.name(), text);
        self.update_card(|card| card.apply_field(field, text))
    }

    /// Apply a pushed entity record. Records for other entities are skipped.
    ///
    /// The id is checked under the card lock, so a record that raced a
    /// configuration change cannot replace the new entity.
    pub fn apply_entity(&self, entity: TimerEntity) -> Result<Option<CardState>, AppError> {
        let entity_id = entity.entity_id.clone();
        let mut matched = false;
        let card = self.update_card(|card| {
            if entity.entity_id != card.entity_id() {
                return card.clone();
            }
            matched = true;
            card.apply_entity(Some(entity))
        })?;

        if !matched {
            debug!("Ignoring update for {}", entity_id);
            return Ok(None);
        }
        debug!("Entity update: {} is {}", entity_id, card.status().name());
        Ok(Some(card))
    }

    /// Re-read the card's entity straight from the backend
    pub fn resync_entity(&self) -> Result<CardState, AppError> {
        let entity_id = self.card()?.entity_id().to_string();
        let entity = self.backend.entity(&entity_id);
        self.update_card(|card| card.apply_entity(entity))
    }

    pub fn tick(&self, now_millis: i64) -> Result<CardState, AppError> {
        self.update_card(|card| card.tick(now_millis))
    }

    /// Send a start, pause or cancel for the card's entity to the backend
    pub fn dispatch(&self, service: TimerService) -> Result<(ServiceCall, CardState), AppError> {
        let card = self.card()?;
        let call = match service {
            TimerService::Start => card.start_call(),
            TimerService::Pause => card.pause_call(),
            TimerService::Cancel => card.cancel_call(),
        };

        let now = Utc::now();
        info!("Calling timer.{} for {}", service, call.data.entity_id);
        let entity = self.backend.call(&call, now)?;

        let now_millis = now.timestamp_millis();
        let card = self.update_card(|card| card.apply_entity(Some(entity)).tick(now_millis))?;
        self.record_action(format!("{} {}", service, call.data.entity_id));
        Ok((call, card))
    }

    fn record_action(&self, action: String) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action);
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
