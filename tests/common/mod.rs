//! Shared test utilities

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDateTime, Timelike};
use mediline_gateway::llm::{ChatBackend, ChatMessage, ChatResponse, FunctionCall, ToolCallRequest, ToolSpec};
use mediline_gateway::{CalendarApi, Error, Result, Slot};

/// In-memory stand-in for the upstream calendar
///
/// Slot state mutates on booking, so a re-check after a successful booking
/// observes the slot as taken — mirroring the live upstream.
#[derive(Default)]
pub struct FakeCalendar {
    days: Mutex<HashMap<String, Vec<Slot>>>,
    day_calls: AtomicUsize,
    booking_calls: AtomicUsize,
}

impl FakeCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the slot list for one date
    pub fn set_day(&self, date: &str, slots: Vec<Slot>) {
        self.days
            .lock()
            .unwrap()
            .insert(date.to_string(), slots);
    }

    /// How many availability fetches have been made
    pub fn day_calls(&self) -> usize {
        self.day_calls.load(Ordering::SeqCst)
    }

    /// How many booking submissions have been made
    pub fn booking_calls(&self) -> usize {
        self.booking_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CalendarApi for FakeCalendar {
    async fn day_slots(&self, date: &str) -> Result<Vec<Slot>> {
        self.day_calls.fetch_add(1, Ordering::SeqCst);
        self.days
            .lock()
            .unwrap()
            .get(date)
            .cloned()
            .ok_or_else(|| Error::Upstream {
                code: "1".to_string(),
                message: "Slot not available.".to_string(),
            })
    }

    async fn add_appointment(&self, visit_datetime: &str) -> Result<()> {
        self.booking_calls.fetch_add(1, Ordering::SeqCst);
        let visit = NaiveDateTime::parse_from_str(visit_datetime, "%Y-%m-%d %I:%M:%S %p")
            .map_err(|_| Error::Upstream {
                code: "1".to_string(),
                message: format!("unparseable visit datetime: {visit_datetime}"),
            })?;
        let date = visit.format("%Y-%m-%d").to_string();

        let mut days = self.days.lock().unwrap();
        let slots = days.get_mut(&date).ok_or_else(|| Error::Upstream {
            code: "1".to_string(),
            message: "Slot not available.".to_string(),
        })?;
        for slot in slots.iter_mut() {
            if slot.clock() == Some(visit.time().with_second(0).unwrap()) {
                if slot.is_booked() {
                    return Err(Error::Upstream {
                        code: "1".to_string(),
                        message: "Slot already booked.".to_string(),
                    });
                }
                *slot = Slot::new(slot.time.clone(), true);
                return Ok(());
            }
        }
        Err(Error::Upstream {
            code: "1".to_string(),
            message: "Slot not available.".to_string(),
        })
    }
}

/// Chat backend that replays a scripted sequence of responses and records
/// every request it sees
#[derive(Default)]
pub struct ScriptedChat {
    responses: Mutex<VecDeque<ChatResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Snapshot of one completion request
pub struct RecordedRequest {
    pub messages: Vec<ChatMessage>,
    pub tool_count: usize,
}

impl ScriptedChat {
    pub fn new(responses: Vec<ChatResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// All requests made so far, in order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        std::mem::take(&mut *self.requests.lock().unwrap())
    }
}

#[async_trait]
impl ChatBackend for ScriptedChat {
    async fn complete(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<ChatResponse> {
        self.requests.lock().unwrap().push(RecordedRequest {
            messages: messages.to_vec(),
            tool_count: tools.len(),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::Llm("scripted chat exhausted".to_string()))
    }
}

/// Convenience constructor for a model-issued tool call
pub fn tool_call(id: &str, name: &str, arguments: &str) -> ToolCallRequest {
    ToolCallRequest {
        id: id.to_string(),
        kind: "function".to_string(),
        function: FunctionCall {
            name: name.to_string(),
            arguments: arguments.to_string(),
        },
    }
}

/// Parse a test timestamp (`YYYY-MM-DD HH:MM:SS`)
pub fn at(datetime: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(datetime, "%Y-%m-%d %H:%M:%S").expect("test timestamp")
}
