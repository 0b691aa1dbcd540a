//! Text-to-speech synthesis
//!
//! Replies are synthesized to MP3 and shipped to the client as one binary
//! websocket frame.

use crate::{Error, Result};

const OPENAI_SPEECH_URL: &str = "https://api.openai.com/v1/audio/speech";
const ELEVENLABS_SPEECH_URL: &str = "https://api.elevenlabs.io/v1/text-to-speech";

enum Backend {
    /// `OpenAI` speech endpoint, voice by name
    OpenAi { voice: String, speed: f32 },
    /// `ElevenLabs` endpoint, voice by id in the URL path
    ElevenLabs { voice_id: String },
}

/// Synthesizes one assistant reply into MP3 bytes
pub struct TextToSpeech {
    http: reqwest::Client,
    api_key: String,
    model: String,
    backend: Backend,
}

impl TextToSpeech {
    /// Synthesize through `OpenAI`.
    ///
    /// # Errors
    ///
    /// Returns an error when the API key is empty.
    pub fn new_openai(api_key: String, voice: String, speed: f32, model: String) -> Result<Self> {
        Self::build(api_key, model, Backend::OpenAi { voice, speed }, "OpenAI")
    }

    /// Synthesize through `ElevenLabs`.
    ///
    /// # Errors
    ///
    /// Returns an error when the API key is empty.
    pub fn new_elevenlabs(api_key: String, voice_id: String, model: String) -> Result<Self> {
        Self::build(api_key, model, Backend::ElevenLabs { voice_id }, "ElevenLabs")
    }

    fn build(api_key: String, model: String, backend: Backend, label: &str) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(format!(
                "{label} API key required for speech synthesis"
            )));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
            model,
            backend,
        })
    }

    /// Synthesize speech for one reply.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Tts`] on a non-success response, [`Error::Http`] on
    /// transport failure.
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let response = match &self.backend {
            Backend::OpenAi { voice, speed } => {
                #[derive(serde::Serialize)]
                struct SpeechRequest<'a> {
                    model: &'a str,
                    input: &'a str,
                    voice: &'a str,
                    speed: f32,
                }
                self.http
                    .post(OPENAI_SPEECH_URL)
                    .bearer_auth(&self.api_key)
                    .json(&SpeechRequest {
                        model: &self.model,
                        input: text,
                        voice,
                        speed: *speed,
                    })
                    .send()
                    .await?
            }
            Backend::ElevenLabs { voice_id } => {
                #[derive(serde::Serialize)]
                struct SpeechRequest<'a> {
                    text: &'a str,
                    model_id: &'a str,
                }
                self.http
                    .post(format!(
                        "{ELEVENLABS_SPEECH_URL}/{voice_id}?output_format=mp3_22050_32"
                    ))
                    .header("xi-api-key", &self.api_key)
                    .json(&SpeechRequest {
                        text,
                        model_id: &self.model,
                    })
                    .send()
                    .await?
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "synthesis request rejected");
            return Err(Error::Tts(format!("synthesis error {status}: {body}")));
        }

        let audio = response.bytes().await?;
        tracing::debug!(bytes = audio.len(), "synthesized speech");
        Ok(audio.to_vec())
    }
}
