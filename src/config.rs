//! Configuration and CLI argument handling

use std::time::Duration;
use clap::Parser;
use tracing::warn;

use crate::{
    duration::{self, TimerDuration},
    state::{CardConfig, TimerEntity},
};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "timer-card")]
#[command(about = "Host a dashboard card that displays and controls a countdown timer")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Timer entity shown on the card
    #[arg(short, long, default_value = "timer.testing")]
    pub entity: String,

    /// Card header, empty for none
    #[arg(long, default_value = "Timer Card")]
    pub header: String,

    /// Friendly name of the timer entity
    #[arg(short, long)]
    pub name: Option<String>,

    /// Configured duration of the timer entity (HH:MM:SS, MM:SS or seconds)
    #[arg(short, long, default_value = "00:05:00")]
    pub duration: String,

    /// Countdown refresh interval in milliseconds
    #[arg(long, default_value = "1000")]
    pub tick_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn card_config(&self) -> CardConfig {
        CardConfig::new(self.header.clone(), self.entity.clone())
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    /// Configured entity duration; unreadable text becomes zero
    pub fn configured_duration(&self) -> TimerDuration {
        if let Err(e) = duration::parse_strict(&self.duration) {
            warn!("Duration '{}' is not valid ({}), using zero", self.duration, e);
        }
        duration::parse(&self.duration)
    }

    /// The timer entity the local backend starts with
    pub fn local_entity(&self) -> TimerEntity {
        TimerEntity::idle(self.entity.trim(), self.name.clone(), self.configured_duration())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["timer-card"]).unwrap();
        assert_eq!(config.address(), "0.0.0.0:20554");
        assert_eq!(config.log_level(), "info");
        assert_eq!(config.card_config(), CardConfig::stub());
        assert_eq!(config.tick_period(), Duration::from_secs(1));
        assert_eq!(config.configured_duration(), TimerDuration::new(0, 5, 0));
    }

    #[test]
    fn test_overrides() {
        let config = Config::try_parse_from([
            "timer-card", "--port", "8080", "--entity", "timer.oven", "--header", "",
            "--name", "Oven", "--duration", "90", "--tick-ms", "0", "-v",
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.card_config().header, None);
        assert_eq!(config.tick_period(), Duration::from_millis(1));

        let entity = config.local_entity();
        assert_eq!(entity.entity_id, "timer.oven");
        assert_eq!(entity.display_name(), "Oven");
        assert_eq!(entity.configured_duration(), Some(TimerDuration::new(0, 1, 30)));
    }

    #[test]
    fn test_bad_duration_is_zero() {
        let config = Config::try_parse_from(["timer-card", "--duration", "later"]).unwrap();
        assert_eq!(config.configured_duration(), TimerDuration::ZERO);
    }
}
