use llm::mock::ScriptedGenerator;
use orchestrator_core::OrchestratorCore;
use protocol::UserProfile;
use router::IntentClassifier;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Scripted model: one classification fallback answer, one symptom answer
    let generator = Arc::new(ScriptedGenerator::with_replies([
        "symptom_check",
        "That sounds like a tension headache. Rest, drink water and dim the lights.",
    ]));
    let core = OrchestratorCore::new(IntentClassifier::new(generator.clone()), generator);

    // Utterances from args, separated by '|', or a default script
    let args = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let script: Vec<String> = if args.trim().is_empty() {
        vec![
            "I have a headache and feel tired".to_string(),
            "it's a dull pain behind my eyes since this morning".to_string(),
            "quit".to_string(),
        ]
    } else {
        args.split('|').map(|s| s.trim().to_string()).collect()
    };

    let profile = UserProfile::new(vec!["Migraine".to_string()], vec![]);
    let outcome = match core.bootstrap(profile) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("error: {}", e);
            return;
        }
    };
    println!("{}", serde_json::to_string_pretty(&outcome.to_turn_reply()).unwrap_or_default());

    let mut state = outcome.state;
    for utterance in script {
        match core.process_turn(state.clone(), &utterance).await {
            Ok(outcome) => {
                println!("{}", serde_json::to_string_pretty(&outcome.to_turn_reply()).unwrap_or_default());
                state = outcome.state;
            }
            Err(e) => {
                eprintln!("error: {}", e);
                break;
            }
        }
    }
}
