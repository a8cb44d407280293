use super::HandlerReply;
use crate::state::HandlerOutcome;

/// Fixed safety message. Never generated, never waits on a collaborator.
#[derive(Debug, Clone)]
pub struct EmergencyHandler {
    message: String,
}

impl EmergencyHandler {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn respond(&self, utterance: &str) -> HandlerReply {
        tracing::warn!(chars = utterance.len(), "emergency routing; issuing fixed safety message");
        HandlerReply::new(self.message.clone(), HandlerOutcome::Escalated)
    }
}
