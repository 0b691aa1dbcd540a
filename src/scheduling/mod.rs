//! Scheduling domain core
//!
//! Time-format adaptation, availability queries, appointment booking, the
//! static doctor roster, and the flat-file meeting ledger.

pub mod availability;
pub mod booking;
pub mod doctors;
pub mod ledger;
pub mod timefmt;

pub use availability::{AvailabilityError, AvailabilityService, NO_SLOTS_MESSAGE, render_slots};
pub use booking::AppointmentScheduler;
pub use doctors::Doctor;
pub use ledger::{MeetingLedger, MeetingRecord};
