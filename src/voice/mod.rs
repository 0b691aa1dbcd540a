//! Voice processing module
//!
//! Speech-to-text and text-to-speech over provider HTTP APIs. Audio bytes
//! pass through the gateway opaquely; there is no local capture or playback.

mod stt;
mod tts;

pub use stt::SpeechToText;
pub use tts::TextToSpeech;
