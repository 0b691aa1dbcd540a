//! Availability query against the upstream calendar
//!
//! Filtering happens in three stages: reject past dates before touching the
//! network, drop booked and already-elapsed slots, then intersect with the
//! caller's time window. Every failure mode maps to a human-readable message
//! the model relays verbatim; an empty result is a sentinel string, never an
//! error.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

use crate::upstream::{CalendarApi, Slot};
use crate::{Error, scheduling::timefmt};

/// Sentinel returned when the query succeeds but nothing matches the window
pub const NO_SLOTS_MESSAGE: &str = "No slots for this time";

/// User-facing availability failures, worded for verbatim relay
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AvailabilityError {
    /// Requested date is before today
    #[error("The date cannot be in the past. Please provide a valid future date.")]
    PastDate,

    /// Date string did not parse, locally or upstream
    #[error("Invalid date format. Please provide the date in a valid format (e.g., YYYY-MM-DD).")]
    InvalidDate,

    /// Upstream reported no data for the date
    #[error("No slots available for the selected date: {0}.")]
    NoData(String),

    /// Window bound did not parse as a time of day
    #[error("Invalid time '{0}'. Please provide times like 9:00 AM or 14:00.")]
    InvalidTime(String),

    /// Upstream rejected the request with an unrecognized message
    #[error("An unknown error occurred: {0}")]
    Upstream(String),

    /// Transport-level failure talking to the upstream
    #[error("An error occurred: {0}")]
    Failed(String),
}

/// Message upstream sends for a date it could not parse
const UPSTREAM_BAD_DATE: &str = "String was not recognized as a valid DateTime.";
/// Message upstream sends when the date has no slot data at all
const UPSTREAM_NO_SLOTS: &str = "Slot not available.";

/// Availability queries for the configured doctor
pub struct AvailabilityService {
    calendar: Arc<dyn CalendarApi>,
}

impl AvailabilityService {
    /// Create a service backed by the given calendar
    #[must_use]
    pub fn new(calendar: Arc<dyn CalendarApi>) -> Self {
        Self { calendar }
    }

    /// Fetch the open slots for `date`: past dates rejected, booked slots
    /// dropped, and (when `date` is today) slots at or before `now` dropped.
    ///
    /// # Errors
    ///
    /// Returns an [`AvailabilityError`] carrying the exact message to relay.
    pub async fn open_slots(
        &self,
        date: &str,
        now: NaiveDateTime,
    ) -> Result<Vec<Slot>, AvailabilityError> {
        let day = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|_| AvailabilityError::InvalidDate)?;
        if day < now.date() {
            return Err(AvailabilityError::PastDate);
        }

        let slots = match self.calendar.day_slots(date.trim()).await {
            Ok(slots) => slots,
            Err(Error::Upstream { message, .. }) => {
                return Err(match message.as_str() {
                    UPSTREAM_BAD_DATE => AvailabilityError::InvalidDate,
                    UPSTREAM_NO_SLOTS => AvailabilityError::NoData(date.trim().to_string()),
                    _ => AvailabilityError::Upstream(message),
                });
            }
            Err(e) => return Err(AvailabilityError::Failed(e.to_string())),
        };

        let cutoff = (day == now.date()).then(|| now.time());
        Ok(filter_open(slots, cutoff))
    }

    /// Open slots for `date` intersected with the inclusive `[start, end]`
    /// window (both bounds in `h:mm AM/PM`), in upstream order.
    ///
    /// # Errors
    ///
    /// Returns an [`AvailabilityError`] carrying the exact message to relay.
    pub async fn slots_in_window(
        &self,
        date: &str,
        start_12h: &str,
        end_12h: &str,
        now: NaiveDateTime,
    ) -> Result<Vec<String>, AvailabilityError> {
        let start = parse_bound(start_12h)?;
        let end = parse_bound(end_12h)?;
        let open = self.open_slots(date, now).await?;
        Ok(window(&open, start, end))
    }
}

fn parse_bound(value: &str) -> Result<NaiveTime, AvailabilityError> {
    timefmt::parse_clock(value).map_err(|_| AvailabilityError::InvalidTime(value.to_string()))
}

/// Drop booked slots and, when a cutoff is given, slots at or before it.
/// Slots whose time string does not parse are skipped.
fn filter_open(slots: Vec<Slot>, cutoff: Option<NaiveTime>) -> Vec<Slot> {
    slots
        .into_iter()
        .filter(|slot| {
            if slot.is_booked() {
                return false;
            }
            match (slot.clock(), cutoff) {
                (Some(clock), Some(cutoff)) => clock > cutoff,
                (Some(_), None) => true,
                (None, _) => false,
            }
        })
        .collect()
}

/// Intersect open slots with the inclusive window, preserving upstream order
fn window(open: &[Slot], start: NaiveTime, end: NaiveTime) -> Vec<String> {
    open.iter()
        .filter_map(|slot| {
            let clock = slot.clock()?;
            (start <= clock && clock <= end).then(|| slot.time.clone())
        })
        .collect()
}

/// Render a window result as the tool-facing string: comma-joined times, or
/// the no-slots sentinel when empty
#[must_use]
pub fn render_slots(times: &[String]) -> String {
    if times.is_empty() {
        NO_SLOTS_MESSAGE.to_string()
    } else {
        times.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(time: &str, booked: bool) -> Slot {
        Slot::new(time, booked)
    }

    #[test]
    fn booked_slots_are_dropped() {
        let open = filter_open(vec![slot("9:00 AM", false), slot("10:00 AM", true)], None);
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].time, "9:00 AM");
    }

    #[test]
    fn cutoff_drops_elapsed_and_current_slots() {
        let cutoff = NaiveTime::from_hms_opt(10, 0, 0);
        let open = filter_open(
            vec![
                slot("9:00 AM", false),
                slot("10:00 AM", false),
                slot("11:00 AM", false),
            ],
            cutoff,
        );
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].time, "11:00 AM");
    }

    #[test]
    fn unparseable_slot_times_are_skipped() {
        let open = filter_open(vec![slot("whenever", false), slot("2:00 PM", false)], None);
        assert_eq!(open.len(), 1);
    }

    #[test]
    fn window_is_inclusive_and_order_preserving() {
        let open = vec![
            slot("11:00 AM", false),
            slot("9:00 AM", false),
            slot("10:00 AM", false),
            slot("12:00 PM", false),
        ];
        let start = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let end = NaiveTime::from_hms_opt(11, 0, 0).unwrap();
        assert_eq!(window(&open, start, end), ["11:00 AM", "9:00 AM", "10:00 AM"]);
    }

    #[test]
    fn render_empty_is_sentinel() {
        assert_eq!(render_slots(&[]), NO_SLOTS_MESSAGE);
        assert_eq!(
            render_slots(&["9:00 AM".to_string(), "10:00 AM".to_string()]),
            "9:00 AM, 10:00 AM"
        );
    }
}
