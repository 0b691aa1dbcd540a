//! Upstream calendar API client
//!
//! The calendar backend is the source of truth for slot state; this crate
//! only queries it and submits bookings against it. All three endpoints are
//! JSON-over-HTTPS and discriminate errors with an `errorCode` field where
//! `"0"` means success. Anything else becomes [`Error::Upstream`]; transport
//! failures stay [`Error::Http`].

mod client;

pub use client::{CalendarClient, CalendarConfig};

use async_trait::async_trait;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::Result;

/// A bookable time unit for one doctor on one date, as reported upstream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    /// Time of day in the upstream's `h:mm AM/PM` keying format
    pub time: String,
    /// `"Y"` when booked; anything else (including absence) means free
    #[serde(rename = "isBooked", default)]
    is_booked: String,
}

impl Slot {
    /// Build a slot value (used by tests and fakes)
    #[must_use]
    pub fn new(time: impl Into<String>, booked: bool) -> Self {
        Self {
            time: time.into(),
            is_booked: if booked { "Y" } else { "N" }.to_string(),
        }
    }

    /// Whether the upstream has this slot flagged as booked
    #[must_use]
    pub fn is_booked(&self) -> bool {
        self.is_booked == "Y"
    }

    /// Time of day parsed from the 12-hour string; `None` when the upstream
    /// sent something unparseable (such slots are simply skipped)
    #[must_use]
    pub fn clock(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(self.time.trim(), "%I:%M %p").ok()
    }
}

/// Seam to the upstream calendar backend
///
/// The production implementation is [`CalendarClient`]; tests substitute
/// in-memory fakes to drive the availability and booking logic.
#[async_trait]
pub trait CalendarApi: Send + Sync {
    /// Fetch the full slot list for one calendar date (`YYYY-MM-DD`)
    async fn day_slots(&self, date: &str) -> Result<Vec<Slot>>;

    /// Submit a booking for `visit_datetime` (`YYYY-MM-DD h:mm:ss AM/PM`)
    async fn add_appointment(&self, visit_datetime: &str) -> Result<()>;
}
