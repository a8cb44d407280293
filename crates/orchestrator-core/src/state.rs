use protocol::Stage;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// What a handler decided about its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerOutcome {
    /// Menu (re)displayed; wait for a choice.
    ShowMenu,
    /// Handler opened a detail round with its clarifying prompt.
    AskForDetails,
    /// Final answer produced.
    Answered,
    /// Detail round repeats: bare selection echo or a failed generation.
    RetryDetails,
    /// Emergency reply issued.
    Escalated,
}

/// Events that can trigger stage transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageEvent {
    /// A new utterance arrived.
    TurnStarted,
    /// An exit keyword; honoured from every stage.
    ExitRequested,
    Handled(HandlerOutcome),
}

/// Core stage transition logic. Total over `Stage` x `StageEvent`: every pair
/// either yields the next stage or a typed rejection.
pub fn transition(stage: Stage, event: StageEvent) -> CoreResult<Stage> {
    use HandlerOutcome::*;

    let next = match (stage, event) {
        (_, StageEvent::ExitRequested) => Stage::Exit,

        (Stage::Emergency | Stage::Exit, _) => return Err(CoreError::SessionClosed(stage)),

        // Starting a turn only moves a finished exchange back to the menu
        (Stage::Complete, StageEvent::TurnStarted) => Stage::AwaitingChoice,
        (current, StageEvent::TurnStarted) => current,

        (Stage::Greeting, StageEvent::Handled(ShowMenu)) => Stage::AwaitingChoice,

        (Stage::AwaitingChoice, StageEvent::Handled(ShowMenu)) => Stage::AwaitingChoice,
        (Stage::AwaitingChoice, StageEvent::Handled(AskForDetails)) => Stage::AwaitingDetails,
        (Stage::AwaitingChoice, StageEvent::Handled(Answered)) => Stage::Complete,
        (Stage::AwaitingChoice, StageEvent::Handled(Escalated)) => Stage::Emergency,

        (Stage::AwaitingDetails, StageEvent::Handled(Answered)) => Stage::Complete,
        (Stage::AwaitingDetails, StageEvent::Handled(RetryDetails)) => Stage::AwaitingDetails,
        (Stage::AwaitingDetails, StageEvent::Handled(Escalated)) => Stage::Emergency,

        (current, event) => {
            return Err(CoreError::InvalidTransition {
                stage: current,
                event: format!("{:?}", event),
            })
        }
    };

    tracing::debug!(from = %stage, to = %next, ?event, "stage transition");
    Ok(next)
}
