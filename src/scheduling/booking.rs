//! Appointment booking
//!
//! Validates a requested date-time against *live* upstream availability and
//! submits the booking. A slot observed earlier in the conversation may have
//! been taken since; no lock spans the check and the booking, so the re-check
//! happens immediately before submission.

use std::sync::{Arc, Mutex};

use chrono::NaiveDateTime;

use crate::Error;
use crate::scheduling::availability::AvailabilityService;
use crate::scheduling::ledger::{MeetingLedger, MeetingRecord};
use crate::upstream::CalendarApi;

/// Confirmation returned after a successful booking
pub const BOOKED_MESSAGE: &str = "Appointment booked successfully.";
/// Rejection for a request before "now"; sent without contacting upstream
pub const PAST_DATETIME_MESSAGE: &str =
    "The date and time cannot be in the past. Please provide a valid future datetime.";
/// Rejection when the exact slot is not open at booking time
pub const SLOT_UNAVAILABLE_MESSAGE: &str = "Doctor not available for the requested time.";
/// Rejection for an unparseable date-time string
pub const PARSE_FAILURE_MESSAGE: &str =
    "Could not understand the requested date and time. Please use YYYY-MM-DD H:MM:SS AM/PM.";

/// Books appointments against the configured doctor's upstream calendar
pub struct AppointmentScheduler {
    availability: AvailabilityService,
    calendar: Arc<dyn CalendarApi>,
    doctor_name: String,
    ledger: Option<Arc<Mutex<MeetingLedger>>>,
}

impl AppointmentScheduler {
    /// Create a scheduler; `ledger` is the optional local audit record
    #[must_use]
    pub fn new(
        calendar: Arc<dyn CalendarApi>,
        doctor_name: impl Into<String>,
        ledger: Option<MeetingLedger>,
    ) -> Self {
        Self {
            availability: AvailabilityService::new(Arc::clone(&calendar)),
            calendar,
            doctor_name: doctor_name.into(),
            ledger: ledger.map(|l| Arc::new(Mutex::new(l))),
        }
    }

    /// Book the slot named by `user_input` (`YYYY-MM-DD H:MM:SS AM/PM`, with
    /// the 24-hour spelling also accepted), returning the user-facing
    /// confirmation or rejection string.
    ///
    /// Past date-times are rejected before any upstream call is made.
    pub async fn schedule(&self, user_input: &str, patient: &str, now: NaiveDateTime) -> String {
        let Some(visit) = parse_visit(user_input) else {
            return PARSE_FAILURE_MESSAGE.to_string();
        };
        if visit < now {
            return PAST_DATETIME_MESSAGE.to_string();
        }

        let date = visit.format("%Y-%m-%d").to_string();
        let open = match self.availability.open_slots(&date, now).await {
            Ok(open) => open,
            Err(e) => return e.to_string(),
        };
        let wanted = visit.time();
        if !open.iter().any(|slot| slot.clock() == Some(wanted)) {
            return SLOT_UNAVAILABLE_MESSAGE.to_string();
        }

        let visit_12h = format_visit(visit);
        match self.calendar.add_appointment(&visit_12h).await {
            Ok(()) => {
                self.log_booking(patient, &visit_12h).await;
                BOOKED_MESSAGE.to_string()
            }
            Err(Error::Upstream { message, .. }) => message,
            Err(e) => format!("An unexpected error occurred: {e}"),
        }
    }

    /// Best-effort ledger write; the file IO runs on the blocking pool so
    /// the booking path never stalls a runtime worker
    async fn log_booking(&self, patient: &str, visit_12h: &str) {
        let Some(ledger) = &self.ledger else { return };
        let ledger = Arc::clone(ledger);
        let record = MeetingRecord {
            doctor: self.doctor_name.clone(),
            patient: patient.to_string(),
            time: visit_12h.to_string(),
        };
        let write = tokio::task::spawn_blocking(move || {
            let Ok(mut ledger) = ledger.lock() else {
                tracing::warn!("meeting ledger lock poisoned, booking not recorded");
                return;
            };
            if let Err(e) = ledger.record(record) {
                tracing::warn!(error = %e, "failed to record booking in ledger");
            }
        });
        if write.await.is_err() {
            tracing::warn!("ledger write task panicked, booking not recorded");
        }
    }
}

/// Parse the fixed-format booking string; 12-hour first, 24-hour fallback
fn parse_visit(user_input: &str) -> Option<NaiveDateTime> {
    let trimmed = user_input.trim();
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %I:%M:%S %p")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M"))
        .ok()
}

/// Render the visit in the upstream's booking format
fn format_visit(visit: NaiveDateTime) -> String {
    // %-I is not portable; build the 12-hour rendering by hand
    use chrono::Timelike;
    let (hour, minute, second) = (visit.hour(), visit.minute(), visit.second());
    let period = if hour >= 12 { "PM" } else { "AM" };
    let display = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!(
        "{} {display}:{minute:02}:{second:02} {period}",
        visit.format("%Y-%m-%d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_spellings() {
        let twelve = parse_visit("2026-10-06 03:00:00 PM").unwrap();
        let twenty_four = parse_visit("2026-10-06 15:00:00").unwrap();
        assert_eq!(twelve, twenty_four);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_visit("next tuesday at three").is_none());
    }

    #[test]
    fn formats_visit_for_upstream() {
        let visit = parse_visit("2026-10-06 15:00:00").unwrap();
        assert_eq!(format_visit(visit), "2026-10-06 3:00:00 PM");

        let midnight = parse_visit("2026-10-06 00:30:00").unwrap();
        assert_eq!(format_visit(midnight), "2026-10-06 12:30:00 AM");
    }
}
