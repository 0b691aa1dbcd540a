//! Speech-to-text over hosted transcription APIs
//!
//! Two wire shapes are supported: the Whisper multipart form (OpenAI and
//! Groq serve the same format at different endpoints) and Deepgram's raw
//! body upload.

use crate::{Error, Result};

const OPENAI_TRANSCRIBE_URL: &str = "https://api.openai.com/v1/audio/transcriptions";
const GROQ_TRANSCRIBE_URL: &str = "https://api.groq.com/openai/v1/audio/transcriptions";
const DEEPGRAM_LISTEN_URL: &str = "https://api.deepgram.com/v1/listen";

enum Backend {
    /// Whisper-compatible multipart endpoint, bearer-authed
    Whisper { endpoint: &'static str },
    /// Deepgram raw-audio upload, token-authed
    Deepgram,
}

/// Turns one utterance of audio into text
pub struct SpeechToText {
    http: reqwest::Client,
    api_key: String,
    model: String,
    backend: Backend,
}

impl SpeechToText {
    /// Transcribe through `OpenAI` Whisper.
    ///
    /// # Errors
    ///
    /// Returns an error when the API key is empty.
    pub fn new_whisper(api_key: String, model: String) -> Result<Self> {
        Self::build(
            api_key,
            model,
            Backend::Whisper {
                endpoint: OPENAI_TRANSCRIBE_URL,
            },
            "OpenAI",
        )
    }

    /// Transcribe through Groq's hosted Whisper.
    ///
    /// # Errors
    ///
    /// Returns an error when the API key is empty.
    pub fn new_groq(api_key: String, model: String) -> Result<Self> {
        Self::build(
            api_key,
            model,
            Backend::Whisper {
                endpoint: GROQ_TRANSCRIBE_URL,
            },
            "Groq",
        )
    }

    /// Transcribe through Deepgram.
    ///
    /// # Errors
    ///
    /// Returns an error when the API key is empty.
    pub fn new_deepgram(api_key: String, model: String) -> Result<Self> {
        Self::build(api_key, model, Backend::Deepgram, "Deepgram")
    }

    fn build(api_key: String, model: String, backend: Backend, label: &str) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(format!(
                "{label} API key required for transcription"
            )));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
            model,
            backend,
        })
    }

    /// Transcribe one utterance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Stt`] on a non-success response, [`Error::Http`] on
    /// transport failure.
    pub async fn transcribe(&self, audio: &[u8]) -> Result<String> {
        tracing::debug!(bytes = audio.len(), model = %self.model, "transcribing utterance");
        let transcript = match &self.backend {
            Backend::Whisper { endpoint } => self.transcribe_whisper(endpoint, audio).await?,
            Backend::Deepgram => self.transcribe_deepgram(audio).await?,
        };
        tracing::info!(transcript = %transcript, "transcription complete");
        Ok(transcript)
    }

    async fn transcribe_whisper(&self, endpoint: &str, audio: &[u8]) -> Result<String> {
        #[derive(serde::Deserialize)]
        struct Transcription {
            text: String,
        }

        let file = reqwest::multipart::Part::bytes(audio.to_vec())
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| Error::Stt(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("file", file)
            .text("model", self.model.clone());

        let response = self
            .http
            .post(endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;
        let body: Transcription = read_json(response).await?;
        Ok(body.text)
    }

    async fn transcribe_deepgram(&self, audio: &[u8]) -> Result<String> {
        #[derive(serde::Deserialize)]
        struct Listen {
            results: ListenResults,
        }
        #[derive(serde::Deserialize)]
        struct ListenResults {
            channels: Vec<ListenChannel>,
        }
        #[derive(serde::Deserialize)]
        struct ListenChannel {
            alternatives: Vec<ListenAlternative>,
        }
        #[derive(serde::Deserialize)]
        struct ListenAlternative {
            transcript: String,
        }

        let response = self
            .http
            .post(format!(
                "{DEEPGRAM_LISTEN_URL}?model={}&punctuate=true",
                self.model
            ))
            .header("Authorization", format!("Token {}", self.api_key))
            .header("Content-Type", "audio/wav")
            .body(audio.to_vec())
            .send()
            .await?;
        let body: Listen = read_json(response).await?;

        Ok(body
            .results
            .channels
            .first()
            .and_then(|c| c.alternatives.first())
            .map(|a| a.transcript.clone())
            .unwrap_or_default())
    }
}

/// Map a non-success status into [`Error::Stt`], otherwise decode the body
async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::error!(status = %status, body = %body, "transcription request rejected");
        return Err(Error::Stt(format!("transcription error {status}: {body}")));
    }
    Ok(response.json().await?)
}
