use protocol::{Intent, Stage};
use thiserror::Error;

/// Integration errors. Recoverable conditions (classification or generation
/// failures) never surface here; they are turned into conversational replies.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("no transition from stage {stage} on {event}")]
    InvalidTransition { stage: Stage, event: String },

    #[error("session is closed at stage {0}; reset it before sending more turns")]
    SessionClosed(Stage),

    #[error("stage awaiting_details has no owning intent")]
    MissingDetailOwner,

    #[error("detail owner {owner} is set outside awaiting_details (stage {stage})")]
    StrayDetailOwner { owner: Intent, stage: Stage },

    #[error("{0} cannot own a detail round")]
    InvalidDetailOwner(Intent),

    #[error("no handler configured for {0}")]
    MissingHandler(Intent),

    #[error("malformed session state: {0}")]
    Malformed(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
