use anyhow::{Context, Result};
use orchestrator::console::{Console, Flow};
use orchestrator::voice::{ConsoleSpeaker, SpeechToText, TypedTranscriber};
use orchestrator::{config, logger, settings::AppSettings};
use orchestrator_core::OrchestratorCore;
use router::IntentClassifier;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<()> {
    config::load_dotenv();
    logger::init_logging();

    let settings = AppSettings::from_env().context("invalid MEDIVOICE_* settings")?;
    let core_config = settings.load_core_config()?;
    let client = Arc::new(settings.build_client()?);
    tracing::info!(provider = %settings.provider, model = %settings.model, "text generator ready");

    let classifier = IntentClassifier::with_rules(core_config.keywords.clone(), client.clone());
    let core = OrchestratorCore::with_config(classifier, client, core_config)?;
    let speaker = ConsoleSpeaker::stdout();
    let mut console = Console::start(core, speaker, settings.profile(), settings.json_output).await?;

    let transcriber = TypedTranscriber;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let utterance = match transcriber.transcribe(line.as_bytes()).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "transcription failed");
                String::new()
            }
        };
        if console.handle_line(&utterance).await? == Flow::Finished {
            break;
        }
    }

    tracing::info!(turns = console.state().turn_count(), "console closed");
    Ok(())
}
