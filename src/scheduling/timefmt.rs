//! Conversions between the 24-hour clock mandated by the assistant prompt
//! and the 12-hour AM/PM strings the upstream calendar API is keyed by.
//!
//! All times live in one implicit local zone; there is no timezone or locale
//! handling anywhere in this crate.

use chrono::{NaiveTime, Timelike};

use crate::{Error, Result};

/// Render a 24-hour wall-clock time as `h:mm AM/PM`.
///
/// Hour 0 maps to `12:xx AM`, hour 12 stays `12:xx PM`, minutes are
/// zero-padded. Callers are expected to pass `hour < 24` and `minute < 60`.
#[must_use]
pub fn to_12_hour(hour: u32, minute: u32) -> String {
    let period = if hour >= 12 { "PM" } else { "AM" };
    let display = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{display}:{minute:02} {period}")
}

/// Parse an `h:mm AM/PM` string back into `(hour, minute)` on the 24-hour
/// clock.
///
/// # Errors
///
/// Returns [`Error::TimeFormat`] when the input is not a valid 12-hour time.
pub fn to_24_hour(time_12h: &str) -> Result<(u32, u32)> {
    let parsed = NaiveTime::parse_from_str(time_12h.trim(), "%I:%M %p")
        .map_err(|_| Error::TimeFormat(time_12h.to_string()))?;
    Ok((parsed.hour(), parsed.minute()))
}

/// Parse a time-of-day in either of the two formats the model may emit:
/// `HH:MM` (24-hour, the prompt contract) or `h:mm AM/PM` (the upstream
/// keying format).
///
/// # Errors
///
/// Returns [`Error::TimeFormat`] when the input fits neither format.
pub fn parse_clock(value: &str) -> Result<NaiveTime> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%I:%M %p")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| Error::TimeFormat(value.to_string()))
}

/// Normalize a time-of-day argument to the 12-hour rendering the upstream
/// slot list is keyed by. Applied at the tool-dispatch boundary, immediately
/// before invoking the availability query or the scheduler.
///
/// # Errors
///
/// Returns [`Error::TimeFormat`] when the input fits neither format.
pub fn normalize_12h(value: &str) -> Result<String> {
    let clock = parse_clock(value)?;
    Ok(to_12_hour(clock.hour(), clock.minute()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midnight_is_twelve_am() {
        assert_eq!(to_12_hour(0, 0), "12:00 AM");
        assert_eq!(to_12_hour(0, 5), "12:05 AM");
    }

    #[test]
    fn noon_stays_pm() {
        assert_eq!(to_12_hour(12, 0), "12:00 PM");
        assert_eq!(to_12_hour(12, 30), "12:30 PM");
    }

    #[test]
    fn afternoon_wraps() {
        assert_eq!(to_12_hour(16, 0), "4:00 PM");
        assert_eq!(to_12_hour(23, 59), "11:59 PM");
    }

    #[test]
    fn round_trips_every_wall_clock_minute() {
        for hour in 0..24 {
            for minute in (0..60).step_by(7) {
                let rendered = to_12_hour(hour, minute);
                let (h, m) = to_24_hour(&rendered).expect("round trip parse");
                assert_eq!((h, m), (hour, minute), "via {rendered}");
            }
        }
    }

    #[test]
    fn parse_clock_accepts_both_formats() {
        let from_24 = parse_clock("16:00").unwrap();
        let from_12 = parse_clock("4:00 PM").unwrap();
        assert_eq!(from_24, from_12);
    }

    #[test]
    fn normalize_passes_12h_through() {
        assert_eq!(normalize_12h("9:00 AM").unwrap(), "9:00 AM");
        assert_eq!(normalize_12h("09:30").unwrap(), "9:30 AM");
        assert_eq!(normalize_12h("00:15").unwrap(), "12:15 AM");
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_clock("sometime soon").is_err());
        assert!(to_24_hour("25:00 PM").is_err());
    }
}
