//! Timer entity record as pushed by the automation backend

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::duration::{self, TimerDuration};

/// Run state of a timer entity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    #[default]
    Idle,
    Active,
    Paused,
}

/// Attributes a timer entity carries next to its state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    /// Configured run length
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    /// Time left when the timer was started or paused
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining: Option<String>,
    /// RFC 3339 deadline, only set while active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finishes_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerEntity {
    pub entity_id: String,
    #[serde(default)]
    pub state: TimerStatus,
    #[serde(default)]
    pub attributes: TimerAttributes,
}

impl TimerEntity {
    /// Create an idle timer with an optional friendly name and configured duration
    pub fn idle(
        entity_id: impl Into<String>,
        friendly_name: Option<String>,
        duration: TimerDuration,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            state: TimerStatus::Idle,
            attributes: TimerAttributes {
                friendly_name,
                duration: Some(duration.format()),
                remaining: None,
                finishes_at: None,
            },
        }
    }

    /// Friendly name, or the entity id when the backend has none
    pub fn display_name(&self) -> &str {
        self.attributes
            .friendly_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(self.entity_id.as_str())
    }

    pub fn is_active(&self) -> bool {
        self.state == TimerStatus::Active
    }

    /// Deadline in Unix milliseconds, if present and readable
    pub fn finishes_at_millis(&self) -> Option<i64> {
        let raw = self.attributes.finishes_at.as_deref()?;
        match DateTime::parse_from_rfc3339(raw) {
            Ok(at) => Some(at.timestamp_millis()),
            Err(e) => {
                warn!("Unreadable finishes_at '{}' on {}: {}", raw, self.entity_id, e);
                None
            }
        }
    }

    pub fn configured_duration(&self) -> Option<TimerDuration> {
        self.attributes.duration.as_deref().map(duration::parse)
    }

    pub fn remaining_duration(&self) -> Option<TimerDuration> {
        self.attributes.remaining.as_deref().map(duration::parse)
    }
}
