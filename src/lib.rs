//! Mediline Gateway - Voice gateway for doctor appointment scheduling
//!
//! This library provides the core functionality for the Mediline gateway:
//! - Websocket voice sessions (audio in, transcript + audio out)
//! - Tool-calling conversation turns against a language model
//! - Availability queries and appointment booking against an upstream
//!   calendar API
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 Websocket client                    │
//! │        binary audio in  │  text + audio out        │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │               Mediline Gateway                      │
//! │   Session loop │ STT/TTS │ Tool dispatch │ Ledger  │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │   LLM (chat completions)  │  Upstream calendar API │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod agent;
pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod prompt;
pub mod scheduling;
pub mod tools;
pub mod upstream;
pub mod voice;

pub use agent::{Conversation, Dispatcher};
pub use config::Config;
pub use error::{Error, Result};
pub use scheduling::{
    AppointmentScheduler, AvailabilityError, AvailabilityService, MeetingLedger, MeetingRecord,
    NO_SLOTS_MESSAGE, render_slots,
};
pub use upstream::{CalendarApi, CalendarClient, CalendarConfig, Slot};
