pub mod config;
pub mod error;
pub mod handlers;
pub mod ports;
pub mod session;
pub mod state;

pub use config::{CoreConfig, DomainSpec, ProfileField};
pub use error::{CoreError, CoreResult};
pub use ports::{GeneratorPort, IntentPort};
pub use session::{DialogueTurn, SessionState};
pub use state::{transition, HandlerOutcome, StageEvent};

use handlers::{DomainHandler, EmergencyHandler, HandlerContext, HandlerReply, MenuHandler};
use llm::TextGenerator;
use protocol::{Intent, Stage, TurnReply, UserProfile};
use router::{ClassificationContext, KeywordRules};

/// Session state after a turn together with the text to speak.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub state: SessionState,
    pub reply: String,
}

impl TurnOutcome {
    fn new(state: SessionState, reply: impl Into<String>) -> Self {
        Self { state, reply: reply.into() }
    }

    pub fn to_turn_reply(&self) -> TurnReply {
        TurnReply::new(self.state.stage(), self.state.intent(), self.reply.clone())
            .with_session_id(self.state.session_id().to_string())
    }
}

/// Headless turn processor: one utterance in, one reply out.
///
/// Holds only read-only configuration and the injected collaborators. Session
/// state travels with each call, so one core can serve any number of sessions.
pub struct OrchestratorCore<C: IntentPort, G: TextGenerator> {
    classifier: C,
    generator: G,
    config: CoreConfig,
    menu: MenuHandler,
    emergency: EmergencyHandler,
    domains: Vec<DomainHandler>,
}

impl<C: IntentPort, G: TextGenerator> OrchestratorCore<C, G> {
    pub fn new(classifier: C, generator: G) -> Self {
        let config = CoreConfig::default();
        let domains = build_domains(&config);
        Self::assemble(classifier, generator, config, domains)
    }

    /// Build with custom texts and tables. Rejects configs missing a domain handler.
    pub fn with_config(classifier: C, generator: G, config: CoreConfig) -> CoreResult<Self> {
        config.validate()?;
        let domains = build_domains(&config);
        Ok(Self::assemble(classifier, generator, config, domains))
    }

    fn assemble(classifier: C, generator: G, config: CoreConfig, domains: Vec<DomainHandler>) -> Self {
        Self {
            classifier,
            generator,
            menu: MenuHandler::from_config(&config),
            emergency: EmergencyHandler::new(config.emergency_message.clone()),
            config,
            domains,
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    fn rules(&self) -> &KeywordRules {
        &self.config.keywords
    }

    fn domain(&self, intent: Intent) -> CoreResult<&DomainHandler> {
        self.domains
            .iter()
            .find(|h| h.intent() == intent)
            .ok_or(CoreError::MissingHandler(intent))
    }

    /// Start a session: greeting plus menu, stage `awaiting_choice`. Not counted as a turn.
    pub fn bootstrap(&self, profile: UserProfile) -> CoreResult<TurnOutcome> {
        let mut state = SessionState::new(profile);
        let reply = self.menu.greeting();
        let next = transition(state.stage(), StageEvent::Handled(reply.outcome))?;
        state.commit(next, None, None)?;
        state.finish_turn(&reply.text, false);
        tracing::info!(session = %state.session_id(), "session started");
        Ok(TurnOutcome::new(state, reply.text))
    }

    /// Back to `greeting` with an empty history. Profile and session id survive.
    pub fn reset(&self, state: SessionState) -> SessionState {
        tracing::info!(session = %state.session_id(), turns = state.turn_count(), "session reset");
        state.reset()
    }

    pub async fn process_turn(&self, mut state: SessionState, utterance: &str) -> CoreResult<TurnOutcome> {
        state.validate()?;
        let utterance = utterance.trim();

        if self.rules().is_exit_command(utterance) {
            return self.exit(state);
        }
        if state.stage().is_closed() {
            return Err(CoreError::SessionClosed(state.stage()));
        }

        let stage = transition(state.stage(), StageEvent::TurnStarted)?;
        let (intent, reply) = match stage {
            Stage::Greeting => (None, self.menu.greeting()),
            Stage::AwaitingChoice => {
                let context = ClassificationContext::new(stage, state.intent().filter(|i| i.is_domain()));
                let classification = self.classifier.classify(utterance, context).await;
                tracing::debug!(
                    session = %state.session_id(),
                    intent = %classification.intent,
                    source = ?classification.source,
                    "utterance classified"
                );
                if classification.intent == Intent::Exit {
                    return self.exit(state);
                }
                (Some(classification.intent), self.dispatch_choice(classification.intent, utterance)?)
            }
            Stage::AwaitingDetails => {
                let owner = state.detail_owner().ok_or(CoreError::MissingDetailOwner)?;
                if self.rules().mentions_emergency(utterance) {
                    (Some(Intent::Emergency), self.emergency.respond(utterance))
                } else {
                    let handler = self.domain(owner)?;
                    let ctx = HandlerContext { utterance, profile: state.profile(), history: state.history() };
                    (Some(owner), handler.continue_with(ctx, &self.generator).await)
                }
            }
            Stage::Complete | Stage::Emergency | Stage::Exit => {
                return Err(CoreError::InvalidTransition { stage, event: "turn dispatch".to_string() })
            }
        };

        let next = transition(stage, StageEvent::Handled(reply.outcome))?;
        let owner = if next == Stage::AwaitingDetails { intent } else { None };
        state.commit(next, intent, owner)?;
        if let Some(turn) = reply.turn {
            state.record(turn);
        }
        state.finish_turn(&reply.text, true);
        tracing::info!(
            session = %state.session_id(),
            turn = state.turn_count(),
            stage = %state.stage(),
            "turn processed"
        );
        Ok(TurnOutcome::new(state, reply.text))
    }

    fn dispatch_choice(&self, intent: Intent, utterance: &str) -> CoreResult<HandlerReply> {
        let reply = match intent {
            Intent::SymptomCheck | Intent::MedicationReminder | Intent::GeneralHealth => {
                self.domain(intent)?.open()
            }
            Intent::Emergency => self.emergency.respond(utterance),
            Intent::Unclear | Intent::Greeting | Intent::Waiting | Intent::Exit => self.menu.unclear(),
        };
        Ok(reply)
    }

    fn exit(&self, mut state: SessionState) -> CoreResult<TurnOutcome> {
        let next = transition(state.stage(), StageEvent::ExitRequested)?;
        state.commit(next, Some(Intent::Exit), None)?;
        state.finish_turn(&self.config.goodbye, true);
        tracing::info!(session = %state.session_id(), turns = state.turn_count(), "session ended");
        Ok(TurnOutcome::new(state, self.config.goodbye.clone()))
    }
}

fn build_domains(config: &CoreConfig) -> Vec<DomainHandler> {
    config
        .domains
        .iter()
        .map(|spec| {
            DomainHandler::new(
                spec.clone(),
                &config.keywords,
                config.bare_selection_max_words,
                config.history_window,
                config.voice_style.clone(),
            )
        })
        .collect()
}

// Simple in-crate mocks for demo/testing
pub mod mocks {
    use super::*;
    use async_trait::async_trait;
    use router::{Classification, ClassificationSource};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers every call with one fixed intent and counts invocations.
    pub struct CountingClassifier {
        intent: Intent,
        calls: AtomicUsize,
    }

    impl CountingClassifier {
        pub fn new(intent: Intent) -> Self {
            Self { intent, calls: AtomicUsize::new(0) }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl IntentPort for CountingClassifier {
        async fn classify(&self, _utterance: &str, _context: ClassificationContext) -> Classification {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Classification { intent: self.intent, source: ClassificationSource::Model }
        }
    }
}
