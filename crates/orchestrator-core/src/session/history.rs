use chrono::{DateTime, Utc};
use protocol::Intent;
use serde::{Deserialize, Serialize};

/// One completed exchange in a detail round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueTurn {
    pub user: String,
    pub assistant: String,
    pub intent: Intent,
    pub timestamp: DateTime<Utc>,
}

impl DialogueTurn {
    pub fn new(intent: Intent, user: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            assistant: assistant.into(),
            intent,
            timestamp: Utc::now(),
        }
    }
}

/// Render the most recent `window` turns as prompt context. Empty when there is no history.
pub fn context_for_prompt(history: &[DialogueTurn], window: usize) -> String {
    if history.is_empty() || window == 0 {
        return String::new();
    }

    let start = history.len().saturating_sub(window);
    let recent = &history[start..];
    let mut context = format!("Conversation so far (last {} exchanges):\n", recent.len());
    for (i, turn) in recent.iter().enumerate() {
        context.push_str(&format!("{}. [User]: {}\n", i + 1, turn.user));
        context.push_str(&format!("   [Assistant]: {}\n", turn.assistant));
    }
    context
}
