use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Protocol version (bumped when breaking changes are introduced)
pub const VERSION: u8 = 1;

/// Position of a conversation in the greeting -> choice -> details -> complete life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Greeting,
    AwaitingChoice,
    AwaitingDetails,
    Complete,
    Emergency,
    Exit,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Greeting,
        Stage::AwaitingChoice,
        Stage::AwaitingDetails,
        Stage::Complete,
        Stage::Emergency,
        Stage::Exit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Greeting => "greeting",
            Stage::AwaitingChoice => "awaiting_choice",
            Stage::AwaitingDetails => "awaiting_details",
            Stage::Complete => "complete",
            Stage::Emergency => "emergency",
            Stage::Exit => "exit",
        }
    }

    /// No further turns are accepted once a session reaches one of these.
    pub fn is_closed(&self) -> bool {
        matches!(self, Stage::Emergency | Stage::Exit)
    }
}

/// Classified purpose of a single utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    SymptomCheck,
    MedicationReminder,
    GeneralHealth,
    Emergency,
    Greeting,
    Unclear,
    Waiting,
    Exit,
}

impl Intent {
    pub const ALL: [Intent; 8] = [
        Intent::SymptomCheck,
        Intent::MedicationReminder,
        Intent::GeneralHealth,
        Intent::Emergency,
        Intent::Greeting,
        Intent::Unclear,
        Intent::Waiting,
        Intent::Exit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::SymptomCheck => "symptom_check",
            Intent::MedicationReminder => "medication_reminder",
            Intent::GeneralHealth => "general_health",
            Intent::Emergency => "emergency",
            Intent::Greeting => "greeting",
            Intent::Unclear => "unclear",
            Intent::Waiting => "waiting",
            Intent::Exit => "exit",
        }
    }

    /// Intents served by a generative handler with a detail round.
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            Intent::SymptomCheck | Intent::MedicationReminder | Intent::GeneralHealth
        )
    }

    /// Menu option number bound to this intent, if any.
    pub fn menu_option(&self) -> Option<u8> {
        match self {
            Intent::SymptomCheck => Some(1),
            Intent::MedicationReminder => Some(2),
            Intent::GeneralHealth => Some(3),
            Intent::Emergency => Some(4),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unrecognized stage: {0:?}")]
    UnknownStage(String),
    #[error("unrecognized intent: {0:?}")]
    UnknownIntent(String),
}

impl FromStr for Stage {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Stage::ALL
            .iter()
            .copied()
            .find(|stage| stage.as_str() == wanted)
            .ok_or_else(|| ParseError::UnknownStage(s.to_string()))
    }
}

impl FromStr for Intent {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Intent::ALL
            .iter()
            .copied()
            .find(|intent| intent.as_str() == wanted)
            .ok_or_else(|| ParseError::UnknownIntent(s.to_string()))
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-owned medical profile. The core reads it; only explicit add operations change it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct UserProfile {
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub medications: Vec<String>,
}

impl UserProfile {
    pub fn new(conditions: Vec<String>, medications: Vec<String>) -> Self {
        Self { conditions, medications }
    }
}

/// Reply envelope for UIs that consume turns as JSON lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct TurnReply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub stage: Stage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    pub text: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub awaiting_input: bool,
}

#[inline]
fn is_false(b: &bool) -> bool { !*b }

impl TurnReply {
    pub fn new<S: Into<String>>(stage: Stage, intent: Option<Intent>, text: S) -> Self {
        TurnReply {
            v: Some(VERSION),
            session_id: None,
            stage,
            intent,
            text: text.into(),
            awaiting_input: matches!(stage, Stage::AwaitingDetails),
        }
    }

    pub fn with_session_id<S: Into<String>>(mut self, id: S) -> Self {
        self.session_id = Some(id.into());
        self
    }
}
