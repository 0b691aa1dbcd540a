//! Conversation state and the per-turn tool dispatcher

mod conversation;
mod dispatcher;

pub use conversation::{Conversation, DEFAULT_MAX_TURNS};
pub use dispatcher::Dispatcher;
