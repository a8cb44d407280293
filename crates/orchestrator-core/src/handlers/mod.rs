pub mod domain;
pub mod emergency;
pub mod menu;

pub use domain::DomainHandler;
pub use emergency::EmergencyHandler;
pub use menu::MenuHandler;

use protocol::UserProfile;

use crate::session::DialogueTurn;
use crate::state::HandlerOutcome;

/// Read-only view of the session a handler works from.
#[derive(Debug, Clone, Copy)]
pub struct HandlerContext<'a> {
    pub utterance: &'a str,
    pub profile: &'a UserProfile,
    pub history: &'a [DialogueTurn],
}

/// Reply text plus what the handler decided; the orchestrator turns the
/// outcome into the next stage.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerReply {
    pub text: String,
    pub outcome: HandlerOutcome,
    /// History entry to append, only for generated answers.
    pub turn: Option<DialogueTurn>,
}

impl HandlerReply {
    pub fn new(text: impl Into<String>, outcome: HandlerOutcome) -> Self {
        Self { text: text.into(), outcome, turn: None }
    }

    pub fn with_turn(mut self, turn: DialogueTurn) -> Self {
        self.turn = Some(turn);
        self
    }
}
