pub mod history;
pub mod state;

pub use history::{context_for_prompt, DialogueTurn};
pub use state::SessionState;
