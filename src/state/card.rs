//! Card display state
//!
//! `CardState` is a value: every operation returns a new state and leaves the
//! old one untouched. Whatever renders the card only ever reads a
//! [`CardView`] snapshot.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::entity::{TimerEntity, TimerStatus};
use crate::{
    duration::{self, DurationField, TimerDuration},
    services::ServiceCall,
};

/// Rows the card asks the dashboard for
pub const CARD_SIZE: u32 = 4;

/// Card configuration as set by the dashboard editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardConfig {
    #[serde(default)]
    pub header: Option<String>,
    pub entity: String,
}

impl CardConfig {
    /// An empty header means the card is rendered without one
    pub fn new(header: impl Into<String>, entity: impl Into<String>) -> Self {
        Self {
            header: Some(header.into()),
            entity: entity.into(),
        }
        .normalized()
    }

    /// Configuration offered when the card is first added to a dashboard
    pub fn stub() -> Self {
        Self::new("Timer Card", "timer.testing")
    }

    pub fn normalized(mut self) -> Self {
        self.header = self.header.filter(|h| !h.is_empty());
        self.entity = self.entity.trim().to_string();
        self
    }

    pub fn card_size(&self) -> u32 {
        CARD_SIZE
    }
}

/// What the card shows in place of the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DisplayStatus {
    /// Backing entity is missing
    Unavailable,
    /// No countdown running; shows the entered or configured duration
    Idle { duration: TimerDuration },
    Active { remaining: TimerDuration },
    Paused { remaining: TimerDuration },
}

impl DisplayStatus {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unavailable => "unavailable",
            Self::Idle { .. } => "idle",
            Self::Active { .. } => "active",
            Self::Paused { .. } => "paused",
        }
    }
}

/// Serializable snapshot of everything the card renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    pub header: Option<String>,
    pub entity: String,
    pub name: Option<String>,
    pub status: String,
    pub display: String,
    pub input: TimerDuration,
    pub lines: Vec<String>,
    pub card_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardState {
    config: CardConfig,
    entity: Option<TimerEntity>,
    input: TimerDuration,
    input_edited: bool,
    last_tick_millis: Option<i64>,
    status: DisplayStatus,
}

impl CardState {
    pub fn new(config: CardConfig) -> Self {
        Self {
            config: config.normalized(),
            entity: None,
            input: TimerDuration::ZERO,
            input_edited: false,
            last_tick_millis: None,
            status: DisplayStatus::Unavailable,
        }
    }

    pub fn config(&self) -> &CardConfig {
        &self.config
    }

    pub fn entity_id(&self) -> &str {
        &self.config.entity
    }

    /// Duration currently in the input fields
    pub fn input(&self) -> TimerDuration {
        self.input
    }

    pub fn status(&self) -> DisplayStatus {
        self.status
    }

    /// Apply a new configuration. Switching entities drops the cached record.
    pub fn with_config(&self, config: CardConfig) -> Self {
        let config = config.normalized();
        let mut next = self.clone();
        if config.entity != self.config.entity {
            next.entity = None;
            next.input_edited = false;
            next.input = TimerDuration::ZERO;
        }
        next.config = config;
        next.refresh()
    }

    /// Read user text into the input fields
    pub fn apply_duration_text(&self, text: &str) -> Self {
        self.apply_duration(duration::parse(text))
    }

    /// Read user text into a single input field, keeping the other two.
    ///
    /// Unreadable text enters 0 for that field.
    pub fn apply_field(&self, field: DurationField, text: &str) -> Self {
        let value = duration::parse_field(text).unwrap_or(0);
        self.apply_duration(self.input.with_field(field, value))
    }

    pub fn apply_duration(&self, input: TimerDuration) -> Self {
        let mut next = self.clone();
        next.input = input;
        next.input_edited = true;
        next.refresh()
    }

    /// Take the latest backend record for this card's entity.
    ///
    /// `None` makes the card unavailable. A record for some other entity is
    /// stale and leaves the state unchanged.
    pub fn apply_entity(&self, entity: Option<TimerEntity>) -> Self {
        if let Some(other) = entity.as_ref().filter(|e| e.entity_id != self.config.entity) {
            debug!("Ignoring record for {} on card for {}", other.entity_id, self.config.entity);
            return self.clone();
        }

        let mut next = self.clone();
        next.entity = entity;
        if !next.input_edited {
            let configured = next.entity.as_ref().and_then(TimerEntity::configured_duration);
            if let Some(configured) = configured {
                next.input = configured;
            }
        }
        next.refresh()
    }

    /// Recompute the countdown for the given instant
    pub fn tick(&self, now_millis: i64) -> Self {
        let mut next = self.clone();
        next.last_tick_millis = Some(now_millis);
        next.refresh()
    }

    fn refresh(mut self) -> Self {
        self.status = self.compute_status();
        self
    }

    fn compute_status(&self) -> DisplayStatus {
        let Some(entity) = &self.entity else {
            return DisplayStatus::Unavailable;
        };
        let frozen = || entity.remaining_duration().unwrap_or_default();

        match entity.state {
            TimerStatus::Idle => DisplayStatus::Idle { duration: self.input },
            TimerStatus::Paused => DisplayStatus::Paused { remaining: frozen() },
            TimerStatus::Active => {
                let remaining = match (self.last_tick_millis, entity.finishes_at_millis()) {
                    (Some(now), Some(finishes_at)) => duration::remaining(now, finishes_at),
                    _ => {
                        debug!(
                            "No deadline or tick for {}, showing remaining attribute",
                            entity.entity_id
                        );
                        frozen()
                    }
                };
                DisplayStatus::Active { remaining }
            }
        }
    }

    /// Text shown where the countdown goes
    pub fn display(&self) -> String {
        match self.status {
            DisplayStatus::Unavailable => {
                format!("entity: {} not available", self.config.entity)
            }
            DisplayStatus::Idle { duration } => duration.format(),
            DisplayStatus::Active { remaining } | DisplayStatus::Paused { remaining } => {
                remaining.format()
            }
        }
    }

    pub fn view(&self) -> CardView {
        let name = self.entity.as_ref().map(|e| e.display_name().to_string());
        let mut lines = Vec::new();
        match (&name, self.status) {
            (None, _) | (_, DisplayStatus::Unavailable) => lines.push(self.display()),
            (Some(name), DisplayStatus::Idle { .. }) => lines.push(format!("Timer: {}", name)),
            (Some(name), _) => {
                lines.push(format!("Timer: {}", name));
                lines.push(format!("Remaining: {}", self.display()));
            }
        }

        CardView {
            header: self.config.header.clone(),
            entity: self.config.entity.clone(),
            name,
            status: self.status.name().to_string(),
            display: self.display(),
            input: self.input,
            lines,
            card_size: self.config.card_size(),
        }
    }

    /// Start the timer with the entered duration
    pub fn start_call(&self) -> ServiceCall {
        ServiceCall::start(&self.config.entity, self.input)
    }

    pub fn pause_call(&self) -> ServiceCall {
        ServiceCall::pause(&self.config.entity)
    }

    pub fn cancel_call(&self) -> ServiceCall {
        ServiceCall::cancel(&self.config.entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::entity::TimerAttributes;

    fn laundry() -> TimerEntity {
        let name = Some("Laundry".to_string());
        TimerEntity::idle("timer.laundry", name, TimerDuration::new(0, 45, 0))
    }

    fn active_until(finishes_at: &str, remaining: &str) -> TimerEntity {
        TimerEntity {
            entity_id: "timer.laundry".to_string(),
            state: TimerStatus::Active,
            attributes: TimerAttributes {
                friendly_name: Some("Laundry".to_string()),
                duration: Some("0:45:00".to_string()),
                remaining: Some(remaining.to_string()),
                finishes_at: Some(finishes_at.to_string()),
            },
        }
    }

    fn card() -> CardState {
        CardState::new(CardConfig::new("Chores", "timer.laundry"))
    }

    #[test]
    fn test_config_normalizes_empty_header() {
        let config = CardConfig::new("", " timer.x ");
        assert_eq!(config.header, None);
        assert_eq!(config.entity, "timer.x");
        assert_eq!(CardConfig::stub().header.as_deref(), Some("Timer Card"));
        assert_eq!(CardConfig::stub().card_size(), 4);
    }

    #[test]
    fn test_new_card_is_unavailable() {
        let view = card().view();
        assert_eq!(view.status, "unavailable");
        assert_eq!(view.display, "entity: timer.laundry not available");
        assert_eq!(view.lines, vec!["entity: timer.laundry not available".to_string()]);
        assert_eq!(view.name, None);
    }

    #[test]
    fn test_idle_adopts_configured_duration() {
        let state = card().apply_entity(Some(laundry()));
        let configured = TimerDuration::new(0, 45, 0);
        assert_eq!(state.status(), DisplayStatus::Idle { duration: configured });
        let view = state.view();
        assert_eq!(view.display, "00:45:00");
        assert_eq!(view.lines, vec!["Timer: Laundry".to_string()]);
    }

    #[test]
    fn test_entered_duration_survives_pushes() {
        let state = card()
            .apply_entity(Some(laundry()))
            .apply_duration_text("5:09")
            .apply_entity(Some(laundry()));
        assert_eq!(state.input(), TimerDuration::new(0, 5, 9));
        assert_eq!(state.display(), "00:05:09");
    }

    #[test]
    fn test_operations_do_not_mutate_original() {
        let original = card().apply_entity(Some(laundry()));
        let edited = original.apply_duration_text("90");
        assert_eq!(original.input(), TimerDuration::new(0, 45, 0));
        assert_eq!(edited.input(), TimerDuration::new(0, 1, 30));
    }

    #[test]
    fn test_bad_text_enters_zero() {
        let state = card().apply_entity(Some(laundry())).apply_duration_text("soon");
        assert_eq!(state.input(), TimerDuration::ZERO);
        assert_eq!(state.display(), "00:00:00");
    }

    #[test]
    fn test_active_counts_down_on_tick() {
        // 2024-03-01T12:45:00Z
        let finishes_at = 1_709_297_100_000;
        let state = card().apply_entity(Some(active_until("2024-03-01T12:45:00Z", "0:45:00")));

        let state = state.tick(finishes_at - 3_661_500);
        let remaining = TimerDuration::new(1, 1, 1);
        assert_eq!(state.status(), DisplayStatus::Active { remaining });
        let view = state.view();
        assert_eq!(view.lines, vec!["Timer: Laundry", "Remaining: 01:01:01"]);

        let state = state.tick(finishes_at + 10_000);
        assert_eq!(state.display(), "00:00:00");
    }

    #[test]
    fn test_active_without_tick_shows_remaining_attribute() {
        let state = card().apply_entity(Some(active_until("2024-03-01T12:45:00Z", "0:45:00")));
        assert_eq!(state.display(), "00:45:00");
    }

    #[test]
    fn test_active_with_unreadable_deadline_shows_remaining_attribute() {
        let state = card()
            .apply_entity(Some(active_until("not a time", "0:12:00")))
            .tick(0);
        let remaining = TimerDuration::new(0, 12, 0);
        assert_eq!(state.status(), DisplayStatus::Active { remaining });
    }

    #[test]
    fn test_paused_shows_frozen_remaining() {
        let mut entity = laundry();
        entity.state = TimerStatus::Paused;
        entity.attributes.remaining = Some("0:10:30".to_string());
        let state = card().apply_entity(Some(entity)).tick(123);
        assert_eq!(state.view().status, "paused");
        assert_eq!(state.display(), "00:10:30");
    }

    #[test]
    fn test_entity_removed_goes_unavailable() {
        let state = card().apply_entity(Some(laundry())).apply_entity(None);
        assert_eq!(state.status(), DisplayStatus::Unavailable);
    }

    #[test]
    fn test_other_entity_is_ignored() {
        let other = TimerEntity::idle("timer.oven", None, TimerDuration::new(0, 20, 0));
        let state = card().apply_entity(Some(other));
        assert_eq!(state.status(), DisplayStatus::Unavailable);
        assert_eq!(state.input(), TimerDuration::ZERO);
    }

    #[test]
    fn test_stale_record_keeps_loaded_entity() {
        let stale = TimerEntity::idle("timer.oven", None, TimerDuration::new(0, 20, 0));
        let loaded = card().apply_entity(Some(laundry()));
        let state = loaded.apply_entity(Some(stale));
        assert_eq!(state, loaded);
        assert_eq!(state.view().name.as_deref(), Some("Laundry"));
        assert_eq!(state.display(), "00:45:00");
    }

    #[test]
    fn test_apply_field_replaces_one_field() {
        let state = card()
            .apply_entity(Some(laundry()))
            .apply_duration_text("01:02:03")
            .apply_field(DurationField::Minutes, "7");
        assert_eq!(state.input(), TimerDuration::new(1, 7, 3));
        assert_eq!(state.display(), "01:07:03");

        let state = state.apply_field(DurationField::Hours, " 0 ");
        assert_eq!(state.input(), TimerDuration::new(0, 7, 3));
    }

    #[test]
    fn test_apply_field_bad_text_enters_zero() {
        let state = card()
            .apply_duration_text("01:02:03")
            .apply_field(DurationField::Seconds, "abc");
        assert_eq!(state.input(), TimerDuration::new(1, 2, 0));
    }

    #[test]
    fn test_edited_field_survives_pushes() {
        let state = card()
            .apply_field(DurationField::Minutes, "10")
            .apply_entity(Some(laundry()));
        assert_eq!(state.input(), TimerDuration::new(0, 10, 0));
        assert_eq!(state.display(), "00:10:00");
    }

    #[test]
    fn test_switching_entity_drops_record() {
        let state = card()
            .apply_entity(Some(laundry()))
            .apply_duration_text("1:00")
            .with_config(CardConfig::new("", "timer.oven"));
        assert_eq!(state.status(), DisplayStatus::Unavailable);
        assert_eq!(state.input(), TimerDuration::ZERO);
        assert_eq!(state.view().header, None);
    }

    #[test]
    fn test_same_entity_config_keeps_record() {
        let state = card()
            .apply_entity(Some(laundry()))
            .with_config(CardConfig::new("Renamed", "timer.laundry"));
        assert_eq!(state.view().header.as_deref(), Some("Renamed"));
        assert_eq!(state.view().status, "idle");
    }

    #[test]
    fn test_service_calls_target_card_entity() {
        let state = card().apply_entity(Some(laundry())).apply_duration_text("01:02:03");
        let start = state.start_call();
        assert_eq!(start.data.entity_id, "timer.laundry");
        assert_eq!(start.data.duration.as_deref(), Some("01:02:03"));
        assert_eq!(state.pause_call().data.duration, None);
        assert_eq!(state.cancel_call().data.entity_id, "timer.laundry");
    }
}
