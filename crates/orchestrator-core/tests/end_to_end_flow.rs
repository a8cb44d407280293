use llm::mock::ScriptedGenerator;
use orchestrator_core::{OrchestratorCore, SessionState};
use protocol::{Intent, Stage, UserProfile};
use router::IntentClassifier;
use std::sync::Arc;

fn profile() -> UserProfile {
    UserProfile::new(
        vec!["Type 2 Diabetes".to_string()],
        vec!["Metformin 500mg - twice daily".to_string()],
    )
}

/// Greeting, keyword-routed symptom choice, then one generated answer.
#[tokio::test]
async fn test_symptom_conversation() {
    let generator = Arc::new(ScriptedGenerator::with_replies([
        "A dull pain behind the eyes is often tension or eye strain. Rest your eyes and drink some water.",
    ]));
    let core = OrchestratorCore::new(IntentClassifier::new(generator.clone()), generator.clone());
    let config = core.config().clone();
    let symptoms = config.domain(Intent::SymptomCheck).unwrap();

    // Turn 1: greeting ignores content
    let outcome = core.process_turn(SessionState::new(profile()), "").await.unwrap();
    assert_eq!(outcome.state.stage(), Stage::AwaitingChoice);
    assert_eq!(outcome.reply, config.greeting_reply());

    // Turn 2: keyword bucket, no model call
    let outcome = core.process_turn(outcome.state, "I have a headache and feel tired").await.unwrap();
    assert_eq!(outcome.state.intent(), Some(Intent::SymptomCheck));
    assert_eq!(outcome.state.stage(), Stage::AwaitingDetails);
    assert_eq!(outcome.reply, symptoms.clarifying_prompt);
    assert_eq!(generator.calls(), 0);

    // Turn 3: details, exactly one generation
    let outcome = core
        .process_turn(outcome.state, "it's a dull pain behind my eyes since this morning")
        .await
        .unwrap();
    assert_eq!(outcome.state.stage(), Stage::Complete);
    assert_eq!(generator.calls(), 1);
    assert_eq!(outcome.state.history().len(), 1);
    assert_eq!(outcome.state.turn_count(), 3);

    let prompt = generator.last_prompt().unwrap();
    assert!(prompt.contains("Type 2 Diabetes"));
    assert!(prompt.contains("it's a dull pain behind my eyes since this morning"));
}

#[tokio::test]
async fn test_detail_round_trip() {
    let generator = Arc::new(ScriptedGenerator::with_replies([
        "Try taking it with breakfast and dinner so it becomes part of your meals.",
    ]));
    let core = OrchestratorCore::new(IntentClassifier::new(generator.clone()), generator.clone());
    let state = core.bootstrap(profile()).unwrap().state;

    let outcome = core.process_turn(state, "2").await.unwrap();
    assert_eq!(outcome.state.stage(), Stage::AwaitingDetails);
    assert_eq!(outcome.state.detail_owner(), Some(Intent::MedicationReminder));
    assert!(outcome.state.history().is_empty());

    let detail = "I keep forgetting my evening metformin dose";
    let outcome = core.process_turn(outcome.state, detail).await.unwrap();
    assert_eq!(outcome.state.stage(), Stage::Complete);
    assert_eq!(outcome.state.history().len(), 1);
    let turn = &outcome.state.history()[0];
    assert_eq!(turn.user, detail);
    assert_eq!(turn.assistant, outcome.reply);
    assert_eq!(turn.intent, Intent::MedicationReminder);
}

#[tokio::test]
async fn test_bare_selection_echo_asks_again() {
    let generator = Arc::new(ScriptedGenerator::new());
    let core = OrchestratorCore::new(IntentClassifier::new(generator.clone()), generator.clone());
    let state = core.bootstrap(profile()).unwrap().state;

    let first = core.process_turn(state, "option 3").await.unwrap();
    assert_eq!(first.state.stage(), Stage::AwaitingDetails);

    let second = core.process_turn(first.state, "three please").await.unwrap();
    assert_eq!(second.state.stage(), Stage::AwaitingDetails);
    assert_eq!(second.reply, first.reply);
    assert_eq!(second.state.detail_owner(), Some(Intent::GeneralHealth));
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_generator_failure_keeps_detail_round() {
    let generator = Arc::new(ScriptedGenerator::new());
    generator.push_failure("timeout");
    generator.push_reply("Keep a regular sleep schedule, even on weekends.");
    let core = OrchestratorCore::new(IntentClassifier::new(generator.clone()), generator.clone());
    let fallback = core.config().domain(Intent::GeneralHealth).unwrap().fallback_reply.clone();
    let state = core.bootstrap(profile()).unwrap().state;

    let state = core.process_turn(state, "3").await.unwrap().state;
    let outcome = core.process_turn(state, "how can I sleep better at night").await.unwrap();
    assert_eq!(outcome.state.stage(), Stage::AwaitingDetails);
    assert_eq!(outcome.reply, fallback);
    assert!(outcome.state.history().is_empty());

    // Same owner, so the retry reaches the same handler
    let outcome = core.process_turn(outcome.state, "how can I sleep better at night").await.unwrap();
    assert_eq!(outcome.state.stage(), Stage::Complete);
    assert_eq!(outcome.state.history().len(), 1);
}

#[tokio::test]
async fn test_menu_redisplay_is_idempotent() {
    let generator = Arc::new(ScriptedGenerator::with_replies(["no idea", "still nothing"]));
    let core = OrchestratorCore::new(IntentClassifier::new(generator.clone()), generator.clone());
    let state = core.bootstrap(profile()).unwrap().state;
    let unclear = core.config().unclear_reply();

    let outcome = core.process_turn(state, "purple elephants").await.unwrap();
    assert_eq!(outcome.state.stage(), Stage::AwaitingChoice);
    assert_eq!(outcome.reply, unclear);

    let outcome = core.process_turn(outcome.state, "purple elephants").await.unwrap();
    assert_eq!(outcome.state.stage(), Stage::AwaitingChoice);
    assert_eq!(outcome.reply, unclear);
}

#[tokio::test]
async fn test_empty_utterance_waits() {
    let generator = Arc::new(ScriptedGenerator::new());
    let core = OrchestratorCore::new(IntentClassifier::new(generator.clone()), generator.clone());
    let state = core.bootstrap(profile()).unwrap().state;

    let outcome = core.process_turn(state, "   ").await.unwrap();
    assert_eq!(outcome.state.stage(), Stage::AwaitingChoice);
    assert_eq!(outcome.state.intent(), Some(Intent::Waiting));
    assert_eq!(outcome.reply, core.config().unclear_reply());
    assert_eq!(generator.calls(), 0);
}
