//! Bounded per-session conversation history

use crate::llm::{ChatMessage, Role};

/// Default cap on non-system turns retained per session
pub const DEFAULT_MAX_TURNS: usize = 64;

/// Ordered, append-only conversation history for one session
///
/// The history doubles as the audit trail of the interaction: tool-call and
/// tool-result turns are appended alongside user and assistant text. Growth
/// is bounded: once the non-system turn count exceeds `max_turns`, the oldest
/// non-system turns are evicted. A tool round leaves as a unit — the wire
/// format rejects a tool-result message with no preceding assistant turn
/// carrying its call id, so results never outlive the turn that issued them.
/// The system prompt is pinned and never evicted.
#[derive(Debug)]
pub struct Conversation {
    turns: Vec<ChatMessage>,
    max_turns: usize,
}

impl Conversation {
    /// Start a conversation seeded with the system prompt
    #[must_use]
    pub fn new(system_prompt: impl Into<String>, max_turns: usize) -> Self {
        Self {
            turns: vec![ChatMessage::system(system_prompt)],
            max_turns: max_turns.max(1),
        }
    }

    /// Append a turn, evicting the oldest non-system turns when over the cap
    pub fn push(&mut self, turn: ChatMessage) {
        self.turns.push(turn);
        while self.non_system_len() > self.max_turns {
            self.evict_oldest();
        }
    }

    /// Remove the oldest non-system turn, taking any tool results that
    /// belong to it along: the window must never start with an orphaned
    /// tool message.
    fn evict_oldest(&mut self) {
        // index 0 is the pinned system prompt
        self.turns.remove(1);
        while self.turns.get(1).is_some_and(|t| t.role == Role::Tool) {
            self.turns.remove(1);
        }
    }

    /// Full ordered history, system prompt first
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.turns
    }

    /// Number of turns including the system prompt
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// True only before the system prompt is set (never, in practice)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    fn non_system_len(&self) -> usize {
        self.turns.iter().filter(|t| t.role != Role::System).count()
    }
}
