//! HTTP API server for the Mediline gateway

pub mod health;
pub mod websocket;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::Result;
use crate::agent::Dispatcher;
use crate::config::SessionConfig;
use crate::voice::{SpeechToText, TextToSpeech};

/// Shared state for API handlers
pub struct ApiState {
    /// Speech-to-text backend
    pub stt: SpeechToText,
    /// Text-to-speech backend
    pub tts: TextToSpeech,
    /// Per-turn tool dispatcher
    pub dispatcher: Dispatcher,
    /// Session behavior (greeting name, termination phrase, history cap)
    pub session: SessionConfig,
}

/// The gateway's HTTP server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
}

impl ApiServer {
    /// Create a server over the given state
    #[must_use]
    pub fn new(state: ApiState, port: u16) -> Self {
        Self {
            state: Arc::new(state),
            port,
        }
    }

    /// Build the full router
    fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .merge(health::router())
            .merge(websocket::router(Arc::clone(&self.state)))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    /// Bind and serve until the process exits.
    ///
    /// # Errors
    ///
    /// Returns an error when the port cannot be bound or the server fails.
    pub async fn serve(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind {addr}: {e}")))?;

        tracing::info!(addr = %addr, "gateway listening");
        axum::serve(listener, self.router())
            .await
            .map_err(|e| crate::Error::Session(e.to_string()))
    }
}
