//! Per-turn tool dispatch
//!
//! One completion request advertising the scheduling tools; when the model
//! calls tools, each is executed and its result appended to the conversation
//! tagged with the originating call id, then a second tool-free completion
//! produces the final reply. A turn with no tool calls returns the model's
//! content directly with no second round-trip.

use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::Result;
use crate::agent::Conversation;
use crate::llm::{ChatBackend, ChatMessage, ToolCallRequest};
use crate::scheduling::{
    AppointmentScheduler, AvailabilityService, doctors, render_slots, timefmt,
};
use crate::tools::ToolInvocation;

/// Bridges the model's tool-call protocol to the scheduling functions
pub struct Dispatcher {
    chat: Arc<dyn ChatBackend>,
    availability: AvailabilityService,
    scheduler: AppointmentScheduler,
}

impl Dispatcher {
    /// Create a dispatcher over the given backends
    #[must_use]
    pub fn new(
        chat: Arc<dyn ChatBackend>,
        availability: AvailabilityService,
        scheduler: AppointmentScheduler,
    ) -> Self {
        Self {
            chat,
            availability,
            scheduler,
        }
    }

    /// Run one user turn: the user turn must already be appended to
    /// `conversation`. Returns the final assistant text; the assistant turn
    /// (and any tool turns) are appended as a side effect.
    ///
    /// `patient` labels the session in the local booking ledger; `now` is the
    /// wall clock the scheduling logic validates against.
    ///
    /// # Errors
    ///
    /// Returns an error only when a completion request fails; a failing tool
    /// short-circuits its own result, not the turn.
    pub async fn run_turn(
        &self,
        conversation: &mut Conversation,
        patient: &str,
        now: NaiveDateTime,
    ) -> Result<String> {
        let specs = ToolInvocation::specs();
        let first = self.chat.complete(conversation.messages(), &specs).await?;

        if first.tool_calls.is_empty() {
            let content = first.content.unwrap_or_default();
            conversation.push(ChatMessage::assistant(content.clone()));
            return Ok(content);
        }

        conversation.push(ChatMessage::assistant_tool_calls(
            first.content,
            first.tool_calls.clone(),
        ));

        for call in &first.tool_calls {
            let output = self.execute(call, patient, now).await;
            tracing::debug!(
                tool = %call.function.name,
                call_id = %call.id,
                output_len = output.len(),
                "tool executed"
            );
            conversation.push(ChatMessage::tool(&call.id, &call.function.name, output));
        }

        let second = self.chat.complete(conversation.messages(), &[]).await?;
        let content = second.content.unwrap_or_default();
        conversation.push(ChatMessage::assistant(content.clone()));
        Ok(content)
    }

    /// Execute one call; every failure mode becomes a payload string
    async fn execute(&self, call: &ToolCallRequest, patient: &str, now: NaiveDateTime) -> String {
        let invocation = match ToolInvocation::parse(&call.function.name, &call.function.arguments) {
            Ok(invocation) => invocation,
            Err(e) => {
                tracing::warn!(tool = %call.function.name, error = %e, "rejected tool call");
                return e.payload();
            }
        };

        match invocation {
            ToolInvocation::ShowAvailableDoctors => doctors::roster_json(),
            ToolInvocation::GetAvailableSlots {
                date,
                start_time,
                end_time,
            } => {
                // the prompt mandates 24-hour input; the slot list is keyed
                // 12-hour, so normalize both bounds here
                let start = match timefmt::normalize_12h(&start_time) {
                    Ok(start) => start,
                    Err(_) => return invalid_time_payload(&start_time),
                };
                let end = match timefmt::normalize_12h(&end_time) {
                    Ok(end) => end,
                    Err(_) => return invalid_time_payload(&end_time),
                };
                match self.availability.slots_in_window(&date, &start, &end, now).await {
                    Ok(times) => render_slots(&times),
                    Err(e) => e.to_string(),
                }
            }
            ToolInvocation::ScheduleAppointment { user_input } => {
                self.scheduler.schedule(&user_input, patient, now).await
            }
        }
    }
}

fn invalid_time_payload(value: &str) -> String {
    format!("Invalid time '{value}'. Please provide times like 9:00 AM or 14:00.")
}
