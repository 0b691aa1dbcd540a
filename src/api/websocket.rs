//! WebSocket handler for voice sessions
//!
//! Protocol: on connect the server sends a plaintext ready message; the
//! client then sends one binary audio frame per utterance and receives a
//! plaintext assistant reply followed by a binary audio reply. The session
//! ends when a transcript contains the termination phrase and the server
//! answers with a farewell.

use std::sync::Arc;

use axum::{
    Router,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
    routing::get,
};
use chrono::Local;

use super::ApiState;
use crate::agent::Conversation;
use crate::prompt;

const READY_MESSAGE: &str = "Please start speaking...";
const FAREWELL_MESSAGE: &str = "Goodbye!";
const TRANSCRIPTION_FAILED: &str = "Error: Unable to transcribe audio.";
const GENERATION_FAILED: &str = "Error: Unable to generate a response.";
const SYNTHESIS_FAILED: &str = "Error: Unable to synthesize speech.";

/// What a processed utterance means for the session
enum TurnOutcome {
    Continue,
    Ended,
}

/// Build WebSocket router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/ws/assistant", get(ws_upgrade))
        .with_state(state)
}

/// Handle WebSocket upgrade request
async fn ws_upgrade(State(state): State<Arc<ApiState>>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle one voice session
async fn handle_socket(mut socket: WebSocket, state: Arc<ApiState>) {
    let session_id = uuid::Uuid::new_v4();

    // Per-connection temp dir: concurrent sessions never share an audio
    // path, and dropping the guard is the cleanup on every exit path
    let temp = match tempfile::tempdir() {
        Ok(temp) => temp,
        Err(e) => {
            tracing::error!(error = %e, "failed to create session temp dir");
            return;
        }
    };

    tracing::info!(session_id = %session_id, "session connected");

    if socket
        .send(Message::Text(READY_MESSAGE.into()))
        .await
        .is_err()
    {
        return;
    }

    let today = Local::now().date_naive();
    let mut conversation = Conversation::new(
        prompt::system_prompt(&state.session.assistant_name, today),
        state.session.max_turns,
    );
    let patient = format!("session-{session_id}");
    let mut utterance_count: u64 = 0;

    while let Some(Ok(message)) = socket.recv().await {
        match message {
            Message::Binary(audio) => {
                utterance_count += 1;
                let audio_path = temp
                    .path()
                    .join(format!("utterance-{utterance_count}.wav"));
                let outcome = handle_utterance(
                    &mut socket,
                    &state,
                    &mut conversation,
                    &patient,
                    &audio,
                    &audio_path,
                )
                .await;
                match outcome {
                    Some(TurnOutcome::Continue) => {}
                    Some(TurnOutcome::Ended) | None => break,
                }
            }
            Message::Close(_) => {
                tracing::info!(session_id = %session_id, "session closed by client");
                break;
            }
            _ => {}
        }
    }

    tracing::info!(
        session_id = %session_id,
        turns = conversation.len(),
        "session ended"
    );
}

/// Process one utterance; `None` means the socket went away mid-turn
async fn handle_utterance(
    socket: &mut WebSocket,
    state: &ApiState,
    conversation: &mut Conversation,
    patient: &str,
    audio: &[u8],
    audio_path: &std::path::Path,
) -> Option<TurnOutcome> {
    tracing::debug!(bytes = audio.len(), "audio frame received");

    // Persist the utterance as a session-local artifact; transcription runs
    // from the in-memory buffer either way
    if let Err(e) = tokio::fs::write(audio_path, audio).await {
        tracing::warn!(error = %e, path = %audio_path.display(), "failed to persist utterance");
    }

    let transcript = match state.stt.transcribe(audio).await {
        Ok(transcript) if !transcript.trim().is_empty() => transcript,
        Ok(_) => {
            tracing::warn!("transcription returned empty text");
            return notify(socket, TRANSCRIPTION_FAILED).await;
        }
        Err(e) => {
            tracing::error!(error = %e, "transcription failed");
            return notify(socket, TRANSCRIPTION_FAILED).await;
        }
    };

    tracing::info!(transcript = %transcript, "user said");

    if ends_session(&transcript, &state.session.termination_phrase) {
        let _ = socket.send(Message::Text(FAREWELL_MESSAGE.into())).await;
        return Some(TurnOutcome::Ended);
    }

    conversation.push(crate::llm::ChatMessage::user(transcript));

    let now = Local::now().naive_local();
    let reply = match state.dispatcher.run_turn(conversation, patient, now).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!(error = %e, "response generation failed");
            return notify(socket, GENERATION_FAILED).await;
        }
    };

    tracing::info!(reply = %reply, "assistant replied");

    if socket
        .send(Message::Text(reply.clone().into()))
        .await
        .is_err()
    {
        return None;
    }

    match state.tts.synthesize(&reply).await {
        Ok(speech) => {
            if socket.send(Message::Binary(speech.into())).await.is_err() {
                return None;
            }
        }
        Err(e) => {
            // the text reply already went out, so the turn still counts
            tracing::error!(error = %e, "speech synthesis failed");
            return notify(socket, SYNTHESIS_FAILED).await;
        }
    }

    Some(TurnOutcome::Continue)
}

/// Report a turn-level failure and keep the session alive
async fn notify(socket: &mut WebSocket, message: &str) -> Option<TurnOutcome> {
    if socket.send(Message::Text(message.into())).await.is_err() {
        None
    } else {
        Some(TurnOutcome::Continue)
    }
}

/// Case-insensitive containment check for the session-ending phrase
fn ends_session(transcript: &str, phrase: &str) -> bool {
    transcript.to_lowercase().contains(&phrase.to_lowercase())
}
