//! TOML configuration file loading
//!
//! Supports `~/.config/mediline/config.toml` as a persistent config source.
//! All fields are optional — the file is a partial overlay underneath
//! environment variables.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct GatewayConfigFile {
    /// LLM configuration
    #[serde(default)]
    pub llm: LlmFileConfig,

    /// Voice (STT/TTS) configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,

    /// Upstream calendar API configuration
    #[serde(default)]
    pub calendar: CalendarFileConfig,

    /// Server/session configuration
    #[serde(default)]
    pub server: ServerFileConfig,
}

/// LLM-related configuration
#[derive(Debug, Default, Deserialize)]
pub struct LlmFileConfig {
    /// Base URL of an OpenAI-compatible endpoint
    pub base_url: Option<String>,

    /// Model identifier (e.g. "llama3-groq-70b-8192-tool-use-preview")
    pub model: Option<String>,

    /// Max tokens per completion
    pub max_tokens: Option<u32>,
}

/// Voice processing configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// STT provider: "groq", "openai" or "deepgram"
    pub stt_provider: Option<String>,

    /// STT model (e.g. "whisper-large-v3")
    pub stt_model: Option<String>,

    /// TTS provider: "openai" or "elevenlabs"
    pub tts_provider: Option<String>,

    /// TTS model (e.g. "tts-1")
    pub tts_model: Option<String>,

    /// TTS voice identifier (e.g. "fable")
    pub tts_voice: Option<String>,

    /// TTS speed multiplier
    pub tts_speed: Option<f32>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
    pub groq: Option<String>,
    pub elevenlabs: Option<String>,
    pub deepgram: Option<String>,
}

/// Upstream calendar credentials and identifiers
#[derive(Debug, Default, Deserialize)]
pub struct CalendarFileConfig {
    pub base_url: Option<String>,
    pub app_id: Option<String>,
    pub app_key: Option<String>,
    pub auth_user_id: Option<u32>,
    pub doctor_id: Option<u32>,
    pub consultation_type: Option<u32>,
    pub call_type: Option<u32>,
    pub booking_user_id: Option<u32>,
}

/// Server and session configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// Port to listen on
    pub port: Option<u16>,

    /// Assistant display name used in the system prompt and greeting
    pub assistant_name: Option<String>,

    /// Phrase that ends a session (matched case-insensitively)
    pub termination_phrase: Option<String>,

    /// Cap on retained non-system conversation turns
    pub max_turns: Option<usize>,

    /// Path of the flat-file meeting ledger; absent disables the ledger
    pub ledger_path: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `GatewayConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> GatewayConfigFile {
    let Some(path) = config_file_path() else {
        return GatewayConfigFile::default();
    };

    if !path.exists() {
        return GatewayConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                GatewayConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            GatewayConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/mediline/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("mediline").join("config.toml"))
}
