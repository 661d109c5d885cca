//! Free-form duration text parsing
//!
//! Accepted shapes are `H:M:S`, `M:S` and a bare number of seconds.
//! [`parse`] never fails and falls back to zero for anything it cannot read;
//! [`parse_strict`] reports the same cases as errors instead.

use thiserror::Error;

use super::TimerDuration;

/// Why a duration string was rejected by [`parse_strict`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseDurationError {
    #[error("duration is empty")]
    Empty,

    #[error("expected 2 or 3 colon-separated parts, found {0}")]
    PartCount(usize),

    #[error("invalid {field} value: {value:?}")]
    InvalidField { field: &'static str, value: String },

    #[error("invalid number of seconds: {0:?}")]
    InvalidTotal(String),
}

const FIELDS: [&str; 3] = ["hours", "minutes", "seconds"];

/// Parse user text into a duration, degrading to zero on bad input.
///
/// Unreadable colon parts count as 0 on their own; a wrong number of parts or
/// a non-numeric string gives the zero duration.
pub fn parse(input: &str) -> TimerDuration {
    let input = input.trim();
    if !input.contains(':') {
        return parse_field(input)
            .map(TimerDuration::from_total_seconds)
            .unwrap_or_default();
    }

    let field = |part: &str| parse_field(part).unwrap_or(0);
    let parts: Vec<&str> = input.split(':').collect();
    match parts.as_slice() {
        [h, m, s] => TimerDuration::new(field(h), field(m), field(s)),
        [m, s] => TimerDuration::new(0, field(m), field(s)),
        _ => TimerDuration::ZERO,
    }
}

/// Parse user text into a duration, rejecting anything [`parse`] would
/// silently turn into zero
pub fn parse_strict(input: &str) -> Result<TimerDuration, ParseDurationError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseDurationError::Empty);
    }
    if !input.contains(':') {
        return parse_field(input)
            .map(TimerDuration::from_total_seconds)
            .ok_or_else(|| ParseDurationError::InvalidTotal(input.to_string()));
    }

    let parts: Vec<&str> = input.split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return Err(ParseDurationError::PartCount(parts.len()));
    }

    // Two parts are minutes and seconds, so line them up from the right.
    let offset = FIELDS.len() - parts.len();
    let mut values = [0u64; 3];
    for (i, part) in parts.iter().enumerate() {
        let field = FIELDS[offset + i];
        values[offset + i] = parse_field(part).ok_or_else(|| ParseDurationError::InvalidField {
            field,
            value: part.trim().to_string(),
        })?;
    }

    Ok(TimerDuration::new(values[0], values[1], values[2]))
}

/// Read one hours, minutes or seconds field.
///
/// Only base-10 digits are accepted, so signs and decimals give `None`.
pub fn parse_field(text: &str) -> Option<u64> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}
