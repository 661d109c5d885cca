//! Service calls sent to the automation backend

use std::fmt;
use serde::{Deserialize, Serialize};

use crate::duration::TimerDuration;

/// Service domain of timer entities
pub const TIMER_DOMAIN: &str = "timer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerService {
    Start,
    Pause,
    Cancel,
}

impl TimerService {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Pause => "pause",
            Self::Cancel => "cancel",
        }
    }
}

impl fmt::Display for TimerService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceData {
    pub entity_id: String,
    /// Canonical `HH:MM:SS`; only sent with `start`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCall {
    pub domain: String,
    pub service: TimerService,
    pub data: ServiceData,
}

impl ServiceCall {
    fn new(service: TimerService, entity_id: &str, duration: Option<String>) -> Self {
        Self {
            domain: TIMER_DOMAIN.to_string(),
            service,
            data: ServiceData {
                entity_id: entity_id.to_string(),
                duration,
            },
        }
    }

    /// Start `entity_id` for `duration`, always sent as `HH:MM:SS`
    pub fn start(entity_id: &str, duration: TimerDuration) -> Self {
        Self::new(TimerService::Start, entity_id, Some(duration.format()))
    }

    pub fn pause(entity_id: &str) -> Self {
        Self::new(TimerService::Pause, entity_id, None)
    }

    pub fn cancel(entity_id: &str) -> Self {
        Self::new(TimerService::Cancel, entity_id, None)
    }
}
