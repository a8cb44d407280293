use super::HandlerReply;
use crate::config::CoreConfig;
use crate::state::HandlerOutcome;

/// Greeting and unclear replies. Both carry the same menu and keep the
/// conversation at the choice point.
#[derive(Debug, Clone)]
pub struct MenuHandler {
    greeting: String,
    unclear: String,
}

impl MenuHandler {
    pub fn from_config(config: &CoreConfig) -> Self {
        Self { greeting: config.greeting_reply(), unclear: config.unclear_reply() }
    }

    pub fn greeting(&self) -> HandlerReply {
        HandlerReply::new(self.greeting.clone(), HandlerOutcome::ShowMenu)
    }

    pub fn unclear(&self) -> HandlerReply {
        HandlerReply::new(self.unclear.clone(), HandlerOutcome::ShowMenu)
    }
}
