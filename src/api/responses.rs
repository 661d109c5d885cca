//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    duration::{DurationField, TimerDuration},
    services::ServiceCall,
    state::CardView,
};

/// Body of POST /card/duration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DurationRequest {
    pub text: String,
    /// Only replace this field; the whole text is a duration when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<DurationField>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DurationResponse {
    /// What the card stored
    pub duration: TimerDuration,
    pub formatted: String,
    /// Whether the text was a well-formed duration
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response of the start/pause/cancel endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub call: ServiceCall,
    pub card: CardView,
}

impl ActionResponse {
    pub fn new(message: String, call: ServiceCall, card: CardView) -> Self {
        Self {
            status: card.status.clone(),
            message,
            timestamp: Utc::now(),
            call,
            card,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub card: CardView,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
