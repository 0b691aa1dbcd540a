//! Configuration management for the Mediline gateway
//!
//! Environment variables win over the optional TOML config file; built-in
//! defaults sit underneath both.

pub mod file;

use std::path::PathBuf;

use crate::upstream::CalendarConfig;
use crate::{Error, Result};

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Per-session behavior
    pub session: SessionConfig,

    /// STT/TTS settings
    pub voice: VoiceConfig,

    /// Chat-completion settings
    pub llm: LlmConfig,

    /// Upstream calendar API settings
    pub calendar: CalendarConfig,

    /// API keys
    pub api_keys: ApiKeys,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
}

/// Session behavior configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Assistant display name used in the system prompt
    pub assistant_name: String,

    /// Phrase that ends the session (matched case-insensitively)
    pub termination_phrase: String,

    /// Cap on retained non-system conversation turns
    pub max_turns: usize,

    /// Flat-file meeting ledger path; `None` disables local booking records
    pub ledger_path: Option<PathBuf>,
}

/// Voice processing configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// STT provider: "groq", "openai" or "deepgram"
    pub stt_provider: String,

    /// STT model identifier
    pub stt_model: String,

    /// TTS provider: "openai" or "elevenlabs"
    pub tts_provider: String,

    /// TTS model identifier
    pub tts_model: String,

    /// TTS voice (OpenAI voice name or ElevenLabs voice id)
    pub tts_voice: String,

    /// TTS speed multiplier
    pub tts_speed: f32,
}

/// Chat-completion configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible endpoint
    pub base_url: String,

    /// Model identifier
    pub model: String,

    /// Max tokens per completion
    pub max_tokens: u32,
}

/// API keys for external services
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// `OpenAI` API key (Whisper STT and TTS)
    pub openai: Option<String>,

    /// Groq API key (chat completions and hosted Whisper)
    pub groq: Option<String>,

    /// `ElevenLabs` API key (optional TTS)
    pub elevenlabs: Option<String>,

    /// Deepgram API key (optional STT)
    pub deepgram: Option<String>,
}

impl ApiKeys {
    /// Key for the configured STT provider
    #[must_use]
    pub fn stt_key(&self, provider: &str) -> Option<&str> {
        match provider {
            "openai" => self.openai.as_deref(),
            "groq" => self.groq.as_deref(),
            "deepgram" => self.deepgram.as_deref(),
            _ => None,
        }
    }

    /// Key for the configured TTS provider
    #[must_use]
    pub fn tts_key(&self, provider: &str) -> Option<&str> {
        match provider {
            "openai" => self.openai.as_deref(),
            "elevenlabs" => self.elevenlabs.as_deref(),
            _ => None,
        }
    }
}

const DEFAULT_PORT: u16 = 18920;
const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_LLM_MODEL: &str = "llama3-groq-70b-8192-tool-use-preview";

impl Config {
    /// Load configuration: env vars over the TOML file, defaults underneath.
    ///
    /// # Errors
    ///
    /// Returns an error when a numeric env var fails to parse or validation
    /// fails.
    pub fn load() -> Result<Self> {
        let fc = file::load_config_file();

        let api_keys = ApiKeys {
            openai: std::env::var("OPENAI_API_KEY").ok().or(fc.api_keys.openai),
            groq: std::env::var("GROQ_API_KEY").ok().or(fc.api_keys.groq),
            elevenlabs: std::env::var("ELEVENLABS_API_KEY")
                .ok()
                .or(fc.api_keys.elevenlabs),
            deepgram: std::env::var("DEEPGRAM_API_KEY")
                .ok()
                .or(fc.api_keys.deepgram),
        };

        let server = ServerConfig {
            port: env_parsed("MEDILINE_PORT")?
                .or(fc.server.port)
                .unwrap_or(DEFAULT_PORT),
        };

        let session = SessionConfig {
            assistant_name: std::env::var("MEDILINE_ASSISTANT_NAME")
                .ok()
                .or(fc.server.assistant_name)
                .unwrap_or_else(|| "Mediline".to_string()),
            termination_phrase: std::env::var("MEDILINE_TERMINATION_PHRASE")
                .ok()
                .or(fc.server.termination_phrase)
                .unwrap_or_else(|| "goodbye".to_string()),
            max_turns: env_parsed("MEDILINE_MAX_TURNS")?
                .or(fc.server.max_turns)
                .unwrap_or(crate::agent::DEFAULT_MAX_TURNS),
            ledger_path: std::env::var("MEDILINE_LEDGER_PATH")
                .ok()
                .or(fc.server.ledger_path)
                .map(PathBuf::from),
        };

        let voice = VoiceConfig {
            stt_provider: std::env::var("MEDILINE_STT_PROVIDER")
                .ok()
                .or(fc.voice.stt_provider)
                .unwrap_or_else(|| "groq".to_string()),
            stt_model: std::env::var("MEDILINE_STT_MODEL")
                .ok()
                .or(fc.voice.stt_model)
                .unwrap_or_else(|| "whisper-large-v3".to_string()),
            tts_provider: std::env::var("MEDILINE_TTS_PROVIDER")
                .ok()
                .or(fc.voice.tts_provider)
                .unwrap_or_else(|| "openai".to_string()),
            tts_model: std::env::var("MEDILINE_TTS_MODEL")
                .ok()
                .or(fc.voice.tts_model)
                .unwrap_or_else(|| "tts-1".to_string()),
            tts_voice: std::env::var("MEDILINE_TTS_VOICE")
                .ok()
                .or(fc.voice.tts_voice)
                .unwrap_or_else(|| "fable".to_string()),
            tts_speed: env_parsed("MEDILINE_TTS_SPEED")?
                .or(fc.voice.tts_speed)
                .unwrap_or(1.0),
        };

        let llm = LlmConfig {
            base_url: std::env::var("MEDILINE_LLM_BASE_URL")
                .ok()
                .or(fc.llm.base_url)
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            model: std::env::var("MEDILINE_LLM_MODEL")
                .ok()
                .or(fc.llm.model)
                .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            max_tokens: env_parsed("MEDILINE_LLM_MAX_TOKENS")?
                .or(fc.llm.max_tokens)
                .unwrap_or(4096),
        };

        let calendar_defaults = CalendarConfig::default();
        let calendar = CalendarConfig {
            base_url: std::env::var("CALENDAR_BASE_URL")
                .ok()
                .or(fc.calendar.base_url)
                .unwrap_or_default(),
            app_id: std::env::var("CALENDAR_APP_ID")
                .ok()
                .or(fc.calendar.app_id)
                .unwrap_or_default(),
            app_key: std::env::var("CALENDAR_APP_KEY")
                .ok()
                .or(fc.calendar.app_key)
                .unwrap_or_default(),
            auth_user_id: env_parsed("CALENDAR_AUTH_USER_ID")?
                .or(fc.calendar.auth_user_id)
                .unwrap_or(calendar_defaults.auth_user_id),
            doctor_id: env_parsed("CALENDAR_DOCTOR_ID")?
                .or(fc.calendar.doctor_id)
                .unwrap_or(calendar_defaults.doctor_id),
            consultation_type: env_parsed("CALENDAR_CONSULTATION_TYPE")?
                .or(fc.calendar.consultation_type)
                .unwrap_or(calendar_defaults.consultation_type),
            call_type: env_parsed("CALENDAR_CALL_TYPE")?
                .or(fc.calendar.call_type)
                .unwrap_or(calendar_defaults.call_type),
            booking_user_id: env_parsed("CALENDAR_BOOKING_USER_ID")?
                .or(fc.calendar.booking_user_id)
                .unwrap_or(calendar_defaults.booking_user_id),
        };

        let config = Self {
            server,
            session,
            voice,
            llm,
            calendar,
            api_keys,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check provider selections against the keys actually present
    ///
    /// # Errors
    ///
    /// Returns a [`Error::Config`] naming the first missing piece.
    pub fn validate(&self) -> Result<()> {
        const STT_PROVIDERS: [&str; 3] = ["groq", "openai", "deepgram"];
        const TTS_PROVIDERS: [&str; 2] = ["openai", "elevenlabs"];

        if !STT_PROVIDERS.contains(&self.voice.stt_provider.as_str()) {
            return Err(Error::Config(format!(
                "invalid STT provider '{}', must be one of {STT_PROVIDERS:?}",
                self.voice.stt_provider
            )));
        }
        if !TTS_PROVIDERS.contains(&self.voice.tts_provider.as_str()) {
            return Err(Error::Config(format!(
                "invalid TTS provider '{}', must be one of {TTS_PROVIDERS:?}",
                self.voice.tts_provider
            )));
        }
        if self.api_keys.stt_key(&self.voice.stt_provider).is_none() {
            return Err(Error::Config(format!(
                "missing API key for STT provider '{}'",
                self.voice.stt_provider
            )));
        }
        if self.api_keys.tts_key(&self.voice.tts_provider).is_none() {
            return Err(Error::Config(format!(
                "missing API key for TTS provider '{}'",
                self.voice.tts_provider
            )));
        }
        if self.api_keys.groq.is_none() {
            return Err(Error::Config(
                "GROQ_API_KEY is required for chat completions".to_string(),
            ));
        }
        if self.calendar.base_url.is_empty() {
            return Err(Error::Config("CALENDAR_BASE_URL is required".to_string()));
        }
        Ok(())
    }
}

/// Read and parse an env var; unset is `None`, unparseable is an error
fn env_parsed<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("invalid value for {name}: {raw}"))),
        Err(_) => Ok(None),
    }
}
