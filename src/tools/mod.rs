//! Scheduling tools advertised to the language model
//!
//! The three tools form a closed set, parsed into a tagged enum so dispatch
//! is exhaustive at compile time. Unknown names and malformed arguments are
//! reported back to the model as structured error payloads inside the tool
//! result, never as a failed turn.

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::llm::ToolSpec;

/// Tool names as advertised on the wire
pub const SHOW_AVAILABLE_DOCTORS: &str = "show_available_doctors";
pub const GET_AVAILABLE_SLOTS: &str = "get_available_slots";
pub const SCHEDULE_APPOINTMENT: &str = "schedule_appointment";

/// A parsed, validated tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolInvocation {
    /// List the doctor roster
    ShowAvailableDoctors,
    /// Query open slots for a date within a time window
    GetAvailableSlots {
        date: String,
        start_time: String,
        end_time: String,
    },
    /// Book the slot named by a fixed-format date-time string
    ScheduleAppointment { user_input: String },
}

/// Why a model-issued call could not be turned into an invocation
#[derive(Debug, Error)]
pub enum ToolParseError {
    /// The model named a tool that was never advertised
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// The arguments were not valid JSON for the tool's schema
    #[error("invalid arguments for {tool}: {source}")]
    BadArguments {
        tool: &'static str,
        source: serde_json::Error,
    },
}

impl ToolParseError {
    /// Render as the JSON error payload fed back to the model
    #[must_use]
    pub fn payload(&self) -> String {
        json!({ "error": self.to_string() }).to_string()
    }
}

#[derive(Deserialize)]
struct SlotsArgs {
    date: String,
    start_time: String,
    end_time: String,
}

#[derive(Deserialize)]
struct ScheduleArgs {
    user_input: String,
}

impl ToolInvocation {
    /// Parse a model-issued `(name, arguments)` pair.
    ///
    /// # Errors
    ///
    /// Returns a [`ToolParseError`] for unknown names or malformed arguments.
    pub fn parse(name: &str, arguments: &str) -> Result<Self, ToolParseError> {
        match name {
            SHOW_AVAILABLE_DOCTORS => Ok(Self::ShowAvailableDoctors),
            GET_AVAILABLE_SLOTS => {
                let args: SlotsArgs =
                    serde_json::from_str(arguments).map_err(|source| ToolParseError::BadArguments {
                        tool: GET_AVAILABLE_SLOTS,
                        source,
                    })?;
                Ok(Self::GetAvailableSlots {
                    date: args.date,
                    start_time: args.start_time,
                    end_time: args.end_time,
                })
            }
            SCHEDULE_APPOINTMENT => {
                let args: ScheduleArgs =
                    serde_json::from_str(arguments).map_err(|source| ToolParseError::BadArguments {
                        tool: SCHEDULE_APPOINTMENT,
                        source,
                    })?;
                Ok(Self::ScheduleAppointment {
                    user_input: args.user_input,
                })
            }
            other => Err(ToolParseError::UnknownTool(other.to_string())),
        }
    }

    /// The three tool declarations advertised on the first completion request
    #[must_use]
    pub fn specs() -> Vec<ToolSpec> {
        vec![
            ToolSpec::function(
                SHOW_AVAILABLE_DOCTORS,
                "Show all available doctors and their specialties",
                json!({ "type": "object", "properties": {} }),
            ),
            ToolSpec::function(
                GET_AVAILABLE_SLOTS,
                "Get the doctor's open appointment slots for a date within a time range",
                json!({
                    "type": "object",
                    "properties": {
                        "date": {
                            "type": "string",
                            "description": "Appointment date, YYYY-MM-DD"
                        },
                        "start_time": {
                            "type": "string",
                            "description": "Start of the desired range, e.g. 9:00 AM or 14:00"
                        },
                        "end_time": {
                            "type": "string",
                            "description": "End of the desired range, e.g. 11:00 AM or 16:00"
                        }
                    },
                    "required": ["date", "start_time", "end_time"]
                }),
            ),
            ToolSpec::function(
                SCHEDULE_APPOINTMENT,
                "Schedule an appointment at an exact date and time",
                json!({
                    "type": "object",
                    "properties": {
                        "user_input": {
                            "type": "string",
                            "description": "Exact appointment datetime, YYYY-MM-DD H:MM:SS AM/PM"
                        }
                    },
                    "required": ["user_input"]
                }),
            ),
        ]
    }
}
