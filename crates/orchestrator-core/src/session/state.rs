use protocol::{Intent, Stage, UserProfile};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::history::DialogueTurn;
use crate::error::{CoreError, CoreResult};

/// The per-conversation record. Owned by the caller between turns; the core takes
/// it by value and hands back the updated copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    session_id: Uuid,
    stage: Stage,
    intent: Option<Intent>,
    /// Domain intent whose handler owns the open detail round.
    detail_owner: Option<Intent>,
    user_profile: UserProfile,
    conversation_history: Vec<DialogueTurn>,
    last_response: String,
    turn_count: u32,
}

impl SessionState {
    pub fn new(user_profile: UserProfile) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            stage: Stage::Greeting,
            intent: None,
            detail_owner: None,
            user_profile,
            conversation_history: Vec::new(),
            last_response: String::new(),
            turn_count: 0,
        }
    }

    /// Restore a state the caller serialised earlier. Unknown stages or intents and
    /// broken detail-round invariants are rejected.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let state: SessionState =
            serde_json::from_str(json).map_err(|e| CoreError::Malformed(e.to_string()))?;
        state.validate()?;
        Ok(state)
    }

    pub fn to_json(&self) -> CoreResult<String> {
        serde_json::to_string(self).map_err(|e| CoreError::Malformed(e.to_string()))
    }

    pub fn session_id(&self) -> Uuid { self.session_id }

    pub fn stage(&self) -> Stage { self.stage }

    pub fn intent(&self) -> Option<Intent> { self.intent }

    pub fn detail_owner(&self) -> Option<Intent> { self.detail_owner }

    pub fn profile(&self) -> &UserProfile { &self.user_profile }

    pub fn history(&self) -> &[DialogueTurn] { &self.conversation_history }

    pub fn last_response(&self) -> &str { &self.last_response }

    pub fn turn_count(&self) -> u32 { self.turn_count }

    pub fn add_medication(&mut self, medication: impl Into<String>) {
        self.user_profile.medications.push(medication.into());
        tracing::info!(
            session = %self.session_id,
            medications = self.user_profile.medications.len(),
            "medication added to profile"
        );
    }

    pub fn add_condition(&mut self, condition: impl Into<String>) {
        self.user_profile.conditions.push(condition.into());
        tracing::info!(
            session = %self.session_id,
            conditions = self.user_profile.conditions.len(),
            "condition added to profile"
        );
    }

    /// Drop all but the newest `keep` exchanges.
    pub fn truncate_history(&mut self, keep: usize) {
        let excess = self.conversation_history.len().saturating_sub(keep);
        self.conversation_history.drain(..excess);
    }

    /// Detail-round invariants: `awaiting_details` always has a domain owner, and
    /// no other stage carries one.
    pub fn validate(&self) -> CoreResult<()> {
        match (self.stage, self.detail_owner) {
            (Stage::AwaitingDetails, None) => Err(CoreError::MissingDetailOwner),
            (Stage::AwaitingDetails, Some(owner)) if !owner.is_domain() => {
                Err(CoreError::InvalidDetailOwner(owner))
            }
            (stage, Some(owner)) if stage != Stage::AwaitingDetails => {
                Err(CoreError::StrayDetailOwner { owner, stage })
            }
            _ => Ok(()),
        }
    }

    /// Back to `greeting` with an empty history; profile and session id are kept.
    pub fn reset(self) -> Self {
        let mut fresh = Self::new(self.user_profile);
        fresh.session_id = self.session_id;
        fresh
    }

    pub(crate) fn commit(
        &mut self,
        stage: Stage,
        intent: Option<Intent>,
        detail_owner: Option<Intent>,
    ) -> CoreResult<()> {
        self.stage = stage;
        self.intent = intent;
        self.detail_owner = detail_owner;
        self.validate()
    }

    pub(crate) fn record(&mut self, turn: DialogueTurn) {
        self.conversation_history.push(turn);
    }

    pub(crate) fn finish_turn(&mut self, reply: &str, counted: bool) {
        self.last_response = reply.to_string();
        if counted {
            self.turn_count += 1;
        }
    }
}
