//! Timer duration value and countdown arithmetic
//!
//! Everything in here is pure: no clocks are read, callers pass "now" in.

mod parser;

use std::{fmt, str::FromStr};
use serde::{Deserialize, Serialize};

pub use parser::{parse, parse_field, parse_strict, ParseDurationError};

/// One of the three input fields of a duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationField {
    Hours,
    Minutes,
    Seconds,
}

impl DurationField {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hours => "hours",
            Self::Minutes => "minutes",
            Self::Seconds => "seconds",
        }
    }
}

/// Hours, minutes and seconds of a timer.
///
/// Minutes and seconds are normally below 60 but values coming from user
/// input are kept as entered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerDuration {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TimerDuration {
    pub const ZERO: Self = Self::new(0, 0, 0);

    pub const fn new(hours: u64, minutes: u64, seconds: u64) -> Self {
        Self { hours, minutes, seconds }
    }

    /// Split a total number of seconds into hours, minutes and seconds
    pub const fn from_total_seconds(total: u64) -> Self {
        Self {
            hours: total / 3600,
            minutes: (total % 3600) / 60,
            seconds: total % 60,
        }
    }

    /// Total length in seconds, saturating on absurd hour counts
    pub fn total_seconds(&self) -> u64 {
        self.hours
            .saturating_mul(3600)
            .saturating_add(self.minutes.saturating_mul(60))
            .saturating_add(self.seconds)
    }

    /// Copy of `self` with one field replaced
    pub fn with_field(&self, field: DurationField, value: u64) -> Self {
        let mut next = *self;
        match field {
            DurationField::Hours => next.hours = value,
            DurationField::Minutes => next.minutes = value,
            DurationField::Seconds => next.seconds = value,
        }
        next
    }

    /// Carry overflowing seconds and minutes so both end up below 60
    pub fn normalized(&self) -> Self {
        Self::from_total_seconds(self.total_seconds())
    }

    pub fn is_zero(&self) -> bool {
        self.total_seconds() == 0
    }

    /// Canonical `HH:MM:SS` text
    pub fn format(&self) -> String {
        self.to_string()
    }

    pub fn to_std(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.total_seconds())
    }
}

impl fmt::Display for TimerDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

impl FromStr for TimerDuration {
    type Err = ParseDurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_strict(s)
    }
}

impl From<std::time::Duration> for TimerDuration {
    fn from(duration: std::time::Duration) -> Self {
        Self::from_total_seconds(duration.as_secs())
    }
}

/// Format a duration as `HH:MM:SS`
pub fn format(duration: TimerDuration) -> String {
    duration.format()
}

/// Time left until `finishes_at_millis`, clamped at zero.
///
/// Both arguments are Unix timestamps in milliseconds. Sub-second leftovers
/// are dropped.
pub fn remaining(now_millis: i64, finishes_at_millis: i64) -> TimerDuration {
    let delta = finishes_at_millis.saturating_sub(now_millis).max(0);
    TimerDuration::from_total_seconds(delta.unsigned_abs() / 1000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_zero() {
        assert_eq!(format(TimerDuration::ZERO), "00:00:00");
    }

    #[test]
    fn test_format_pads_to_two_digits() {
        assert_eq!(TimerDuration::new(1, 2, 3).to_string(), "01:02:03");
        assert_eq!(TimerDuration::new(12, 34, 56).format(), "12:34:56");
    }

    #[test]
    fn test_format_does_not_truncate_large_hours() {
        assert_eq!(TimerDuration::new(100, 0, 5).format(), "100:00:05");
    }

    #[test]
    fn test_format_keeps_out_of_range_fields() {
        assert_eq!(TimerDuration::new(0, 75, 120).format(), "00:75:120");
    }

    #[test]
    fn test_round_trip_canonical_strings() {
        for text in ["00:00:00", "01:02:03", "00:59:59", "23:00:01", "100:30:00"] {
            assert_eq!(parse(text).format(), text);
        }
    }

    #[test]
    fn test_round_trip_values() {
        for d in [
            TimerDuration::ZERO,
            TimerDuration::new(0, 5, 9),
            TimerDuration::new(7, 59, 0),
            TimerDuration::new(250, 1, 1),
        ] {
            assert_eq!(parse(&format(d)), d);
        }
    }

    #[test]
    fn test_decomposition_law() {
        let edges = [59, 60, 3599, 3600, 3661, 86_399, 86_400, 360_000, 1_000_000_007];
        let samples = (0..4000).chain(edges);
        for t in samples {
            let d = TimerDuration::from_total_seconds(t);
            assert!(d.minutes < 60 && d.seconds < 60);
            assert_eq!(d.hours * 3600 + d.minutes * 60 + d.seconds, t);
            assert_eq!(d.total_seconds(), t);
        }
    }

    #[test]
    fn test_remaining_exact_zero() {
        assert_eq!(remaining(1000, 1000), TimerDuration::ZERO);
    }

    #[test]
    fn test_remaining_past_deadline_clamps() {
        assert_eq!(remaining(5000, 1000), TimerDuration::ZERO);
    }

    #[test]
    fn test_remaining_hour_minute_second() {
        assert_eq!(remaining(0, 3_661_000), TimerDuration::new(1, 1, 1));
    }

    #[test]
    fn test_remaining_floors_sub_second() {
        assert_eq!(remaining(0, 1999), TimerDuration::new(0, 0, 1));
        assert_eq!(remaining(0, 999), TimerDuration::ZERO);
    }

    #[test]
    fn test_remaining_extreme_inputs() {
        assert_eq!(remaining(i64::MAX, i64::MIN), TimerDuration::ZERO);
        let far = remaining(i64::MIN, i64::MAX);
        assert_eq!(far.total_seconds(), (i64::MAX as u64) / 1000);
    }

    #[test]
    fn test_std_conversions() {
        let d = TimerDuration::from(std::time::Duration::from_millis(90_500));
        assert_eq!(d, TimerDuration::new(0, 1, 30));
        assert_eq!(d.to_std(), std::time::Duration::from_secs(90));
    }

    #[test]
    fn test_from_str_is_strict() {
        assert_eq!("1:00:00".parse::<TimerDuration>(), Ok(TimerDuration::new(1, 0, 0)));
        assert!("abc".parse::<TimerDuration>().is_err());
    }

    #[test]
    fn test_with_field_replaces_one_field() {
        let d = TimerDuration::new(1, 2, 3);
        assert_eq!(d.with_field(DurationField::Hours, 9), TimerDuration::new(9, 2, 3));
        assert_eq!(d.with_field(DurationField::Minutes, 75), TimerDuration::new(1, 75, 3));
        assert_eq!(d.with_field(DurationField::Seconds, 0), TimerDuration::new(1, 2, 0));
        assert_eq!(d, TimerDuration::new(1, 2, 3));
    }

    #[test]
    fn test_normalized_carries_overflow() {
        assert_eq!(TimerDuration::new(0, 0, 90).normalized(), TimerDuration::new(0, 1, 30));
        assert_eq!(TimerDuration::new(1, 75, 61).normalized(), TimerDuration::new(2, 16, 1));
        assert_eq!(TimerDuration::new(3, 4, 5).normalized(), TimerDuration::new(3, 4, 5));
    }

    #[test]
    fn test_total_seconds_saturates() {
        assert_eq!(TimerDuration::new(u64::MAX, 0, 0).total_seconds(), u64::MAX);
    }
}
