use anyhow::Result;
use async_trait::async_trait;
use llm::mock::ScriptedGenerator;
use orchestrator::console::{Console, Flow, REPROMPT};
use orchestrator::voice::TextToSpeech;
use orchestrator_core::OrchestratorCore;
use protocol::{Stage, TurnReply, UserProfile};
use router::IntentClassifier;
use std::sync::{Arc, Mutex};

/// Collects everything the console would have spoken.
#[derive(Default)]
struct RecordingSpeaker {
    spoken: Mutex<Vec<String>>,
}

impl RecordingSpeaker {
    fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextToSpeech for RecordingSpeaker {
    async fn synthesize(&self, text: &str) -> Result<()> {
        self.spoken.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

type TestConsole = Console<IntentClassifier<Arc<ScriptedGenerator>>, Arc<ScriptedGenerator>, RecordingSpeaker>;

async fn console(generator: Arc<ScriptedGenerator>, json: bool) -> TestConsole {
    let core = OrchestratorCore::new(IntentClassifier::new(generator.clone()), generator);
    Console::start(core, RecordingSpeaker::default(), UserProfile::default(), json)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_full_console_journey() {
    let generator = Arc::new(ScriptedGenerator::with_replies([
        "Missing one dose is usually fine. Take the next one at the normal time.",
    ]));
    let mut console = console(generator.clone(), false).await;

    assert_eq!(console.handle_line("").await.unwrap(), Flow::Continue);
    assert_eq!(console.handle_line("add medication Metformin 500mg - twice daily").await.unwrap(), Flow::Continue);
    assert_eq!(console.handle_line("2").await.unwrap(), Flow::Continue);
    assert_eq!(console.state().stage(), Stage::AwaitingDetails);
    assert_eq!(console.handle_line("I missed my morning dose").await.unwrap(), Flow::Continue);
    assert_eq!(console.state().stage(), Stage::Complete);
    assert_eq!(console.handle_line("quit").await.unwrap(), Flow::Finished);

    let spoken = console.speaker().spoken();
    assert!(spoken[0].starts_with("Hello! I'm your Medical Voice Assistant."));
    assert_eq!(spoken[1], REPROMPT);
    assert_eq!(spoken[2], "Added medication: Metformin 500mg - twice daily");
    assert_eq!(spoken.last().unwrap(), "Take care of your health! Goodbye!");
    assert!(generator.last_prompt().unwrap().contains("Metformin 500mg - twice daily"));
    assert_eq!(console.state().stage(), Stage::Exit);
}

#[tokio::test]
async fn test_emergency_ends_console() {
    let mut console = console(Arc::new(ScriptedGenerator::new()), false).await;
    assert_eq!(console.handle_line("I can't breathe").await.unwrap(), Flow::Finished);
    assert_eq!(console.state().stage(), Stage::Emergency);
}

#[tokio::test]
async fn test_profile_and_reset_commands() {
    let mut console = console(Arc::new(ScriptedGenerator::new()), false).await;
    console.handle_line("add condition Asthma").await.unwrap();
    console.handle_line("1").await.unwrap();
    console.handle_line("profile").await.unwrap();
    console.handle_line("reset").await.unwrap();

    assert_eq!(console.state().stage(), Stage::AwaitingChoice);
    assert_eq!(console.state().profile().conditions, vec!["Asthma".to_string()]);
    let spoken = console.speaker().spoken();
    assert!(spoken.iter().any(|s| s == "Conditions: Asthma\nMedications: none"));
    assert_eq!(spoken.last(), spoken.first());
}

#[tokio::test]
async fn test_json_mode_emits_turn_replies() {
    let mut console = console(Arc::new(ScriptedGenerator::new()), true).await;
    console.handle_line("3").await.unwrap();

    let spoken = console.speaker().spoken();
    let greeting: TurnReply = serde_json::from_str(&spoken[0]).unwrap();
    assert_eq!(greeting.stage, Stage::AwaitingChoice);
    let choice: TurnReply = serde_json::from_str(&spoken[1]).unwrap();
    assert_eq!(choice.stage, Stage::AwaitingDetails);
    assert!(choice.awaiting_input);
    assert_eq!(choice.session_id, greeting.session_id);
}
