//! Timer backend seam and an in-process implementation

use std::{collections::HashMap, sync::Mutex};
use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::commands::{ServiceCall, TimerService, TIMER_DOMAIN};
use crate::{
    duration::{self, TimerDuration},
    state::{TimerEntity, TimerStatus},
};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    #[error("unsupported service domain: {0}")]
    UnsupportedDomain(String),

    #[error("backend state lock poisoned")]
    Poisoned,
}

/// Automation backend holding timer entities
pub trait TimerBackend: Send + Sync {
    /// Current record of an entity, if it exists
    fn entity(&self, entity_id: &str) -> Option<TimerEntity>;

    /// Run a service call and return the entity's new record
    fn call(&self, call: &ServiceCall, now: DateTime<Utc>) -> Result<TimerEntity, BackendError>;

    /// Finish every active timer whose deadline is at or before `now`
    fn expire(&self, now: DateTime<Utc>) -> Vec<TimerEntity>;

    /// Receive every changed entity record
    fn subscribe(&self) -> broadcast::Receiver<TimerEntity>;
}

/// In-memory timer entities with start/pause/cancel semantics
pub struct LocalTimerBackend {
    entities: Mutex<HashMap<String, TimerEntity>>,
    updates_tx: broadcast::Sender<TimerEntity>,
}

impl LocalTimerBackend {
    pub fn new() -> Self {
        let (updates_tx, _) = broadcast::channel(100);
        Self {
            entities: Mutex::new(HashMap::new()),
            updates_tx,
        }
    }

    pub fn with_entity(self, entity: TimerEntity) -> Self {
        self.insert(entity);
        self
    }

    /// Add or replace an entity and announce it
    pub fn insert(&self, entity: TimerEntity) {
        match self.entities.lock() {
            Ok(mut entities) => {
                entities.insert(entity.entity_id.clone(), entity.clone());
                drop(entities);
                self.publish(entity);
            }
            Err(_) => warn!("Cannot insert {}: backend state lock poisoned", entity.entity_id),
        }
    }

    fn publish(&self, entity: TimerEntity) {
        if self.updates_tx.send(entity).is_err() {
            debug!("No subscribers for entity update");
        }
    }
}

impl Default for LocalTimerBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerBackend for LocalTimerBackend {
    fn entity(&self, entity_id: &str) -> Option<TimerEntity> {
        self.entities.lock().ok()?.get(entity_id).cloned()
    }

    fn call(&self, call: &ServiceCall, now: DateTime<Utc>) -> Result<TimerEntity, BackendError> {
        if call.domain != TIMER_DOMAIN {
            return Err(BackendError::UnsupportedDomain(call.domain.clone()));
        }

        let mut entities = self.entities.lock().map_err(|_| BackendError::Poisoned)?;
        let entity = entities
            .get_mut(&call.data.entity_id)
            .ok_or_else(|| BackendError::UnknownEntity(call.data.entity_id.clone()))?;

        match call.service {
            TimerService::Start => {
                // A zero duration means "resume, or run for the configured length".
                let requested = call
                    .data
                    .duration
                    .as_deref()
                    .map(duration::parse)
                    .filter(|d| !d.is_zero());
                start(entity, requested, now);
            }
            TimerService::Pause => pause(entity, now),
            TimerService::Cancel => finish(entity),
        }
        info!("timer.{} on {} -> {:?}", call.service, entity.entity_id, entity.state);

        let updated = entity.clone();
        drop(entities);
        self.publish(updated.clone());
        Ok(updated)
    }

    fn expire(&self, now: DateTime<Utc>) -> Vec<TimerEntity> {
        let Ok(mut entities) = self.entities.lock() else {
            warn!("Skipping timer expiry: backend state lock poisoned");
            return Vec::new();
        };

        let now_millis = now.timestamp_millis();
        let mut finished = Vec::new();
        for entity in entities.values_mut() {
            let due = entity.is_active()
                && entity.finishes_at_millis().is_some_and(|at| at <= now_millis);
            if due {
                info!("Timer {} finished", entity.entity_id);
                finish(entity);
                finished.push(entity.clone());
            }
        }
        drop(entities);

        for entity in &finished {
            self.publish(entity.clone());
        }
        finished
    }

    fn subscribe(&self) -> broadcast::Receiver<TimerEntity> {
        self.updates_tx.subscribe()
    }
}

fn start(entity: &mut TimerEntity, requested: Option<TimerDuration>, now: DateTime<Utc>) {
    let run_for = match requested {
        Some(requested) => {
            let requested = requested.normalized();
            entity.attributes.duration = Some(requested.format());
            requested
        }
        None if entity.state == TimerStatus::Paused => {
            entity.remaining_duration().unwrap_or_default().normalized()
        }
        None => entity.configured_duration().unwrap_or_default().normalized(),
    };

    let finishes_at = i64::try_from(run_for.total_seconds())
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|delta| now.checked_add_signed(delta));
    if finishes_at.is_none() {
        warn!("Duration {} of {} is out of range, no deadline set", run_for, entity.entity_id);
    }

    entity.state = TimerStatus::Active;
    entity.attributes.remaining = Some(run_for.format());
    entity.attributes.finishes_at = finishes_at.map(|at| at.to_rfc3339());
}

fn pause(entity: &mut TimerEntity, now: DateTime<Utc>) {
    if !entity.is_active() {
        debug!("{} is not active, pause ignored", entity.entity_id);
        return;
    }
    let left = entity
        .finishes_at_millis()
        .map(|at| duration::remaining(now.timestamp_millis(), at))
        .or_else(|| entity.remaining_duration())
        .unwrap_or_default();

    entity.state = TimerStatus::Paused;
    entity.attributes.remaining = Some(left.format());
    entity.attributes.finishes_at = None;
}

fn finish(entity: &mut TimerEntity) {
    entity.state = TimerStatus::Idle;
    entity.attributes.remaining = None;
    entity.attributes.finishes_at = None;
}
