use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mediline_gateway::agent::Dispatcher;
use mediline_gateway::api::{ApiServer, ApiState};
use mediline_gateway::scheduling::{AppointmentScheduler, AvailabilityService, MeetingLedger};
use mediline_gateway::upstream::{CalendarApi, CalendarClient};
use mediline_gateway::voice::{SpeechToText, TextToSpeech};
use mediline_gateway::{Config, Error};

/// Mediline - Voice gateway for doctor appointment scheduling
#[derive(Parser)]
#[command(name = "mediline", version, about)]
struct Cli {
    /// Port to listen on
    #[arg(long, env = "MEDILINE_PORT")]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,mediline_gateway=info",
        1 => "info,mediline_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load()?;
    let port = cli.port.unwrap_or(config.server.port);

    let stt = build_stt(&config)?;
    let tts = build_tts(&config)?;

    let chat = mediline_gateway::llm::OpenAiChatClient::new(
        config.llm.base_url.clone(),
        config.api_keys.groq.clone().unwrap_or_default(),
        config.llm.model.clone(),
        config.llm.max_tokens,
    )?;

    let calendar: Arc<dyn CalendarApi> = Arc::new(CalendarClient::new(config.calendar.clone()));

    let ledger = config
        .session
        .ledger_path
        .as_ref()
        .map(MeetingLedger::load)
        .transpose()?;
    if let Some(ledger) = &ledger {
        tracing::info!(bookings = ledger.meetings().len(), "meeting ledger loaded");
    }

    let doctor_name = mediline_gateway::scheduling::doctors::roster()
        .iter()
        .find(|d| d.id == config.calendar.doctor_id)
        .map_or("Unknown", |d| d.name);

    let availability = AvailabilityService::new(Arc::clone(&calendar));
    let scheduler = AppointmentScheduler::new(Arc::clone(&calendar), doctor_name, ledger);
    let dispatcher = Dispatcher::new(Arc::new(chat), availability, scheduler);

    let state = ApiState {
        stt,
        tts,
        dispatcher,
        session: config.session.clone(),
    };

    tracing::info!(
        port,
        stt = %config.voice.stt_provider,
        tts = %config.voice.tts_provider,
        model = %config.llm.model,
        "starting gateway"
    );

    ApiServer::new(state, port).serve().await?;
    Ok(())
}

fn build_stt(config: &Config) -> Result<SpeechToText, Error> {
    let key = config
        .api_keys
        .stt_key(&config.voice.stt_provider)
        .unwrap_or_default()
        .to_string();
    let model = config.voice.stt_model.clone();
    match config.voice.stt_provider.as_str() {
        "openai" => SpeechToText::new_whisper(key, model),
        "deepgram" => SpeechToText::new_deepgram(key, model),
        _ => SpeechToText::new_groq(key, model),
    }
}

fn build_tts(config: &Config) -> Result<TextToSpeech, Error> {
    let key = config
        .api_keys
        .tts_key(&config.voice.tts_provider)
        .unwrap_or_default()
        .to_string();
    let model = config.voice.tts_model.clone();
    match config.voice.tts_provider.as_str() {
        "elevenlabs" => TextToSpeech::new_elevenlabs(key, config.voice.tts_voice.clone(), model),
        _ => TextToSpeech::new_openai(
            key,
            config.voice.tts_voice.clone(),
            config.voice.tts_speed,
            model,
        ),
    }
}
