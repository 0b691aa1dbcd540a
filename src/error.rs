//! Error types for the Mediline gateway

use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// Language model error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Upstream calendar API rejected the request
    #[error("upstream error {code}: {message}")]
    Upstream {
        /// The `errorCode` field of the upstream envelope ("0" is success)
        code: String,
        /// Human-readable message from the upstream envelope
        message: String,
    },

    /// Session/transport error
    #[error("session error: {0}")]
    Session(String),

    /// Time value that fits neither the 24-hour nor the 12-hour AM/PM format
    #[error("unrecognized time format: {0}")]
    TimeFormat(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
