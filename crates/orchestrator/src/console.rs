use anyhow::Result;
use llm::TextGenerator;
use orchestrator_core::{IntentPort, OrchestratorCore, SessionState, TurnOutcome};

use crate::voice::TextToSpeech;

pub const REPROMPT: &str = "I didn't catch that. Could you please repeat?";

/// Console commands layered on top of plain utterances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Profile,
    AddMedication(String),
    AddCondition(String),
    Reset,
    Utterance(String),
    Empty,
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let lower = trimmed.to_lowercase();
        if trimmed.is_empty() {
            return Command::Empty;
        }
        if lower == "profile" {
            return Command::Profile;
        }
        if lower == "reset" {
            return Command::Reset;
        }
        if let Some(rest) = strip_command(trimmed, &lower, "add medication ") {
            return Command::AddMedication(rest);
        }
        if let Some(rest) = strip_command(trimmed, &lower, "add condition ") {
            return Command::AddCondition(rest);
        }
        Command::Utterance(trimmed.to_string())
    }
}

fn strip_command(original: &str, lower: &str, prefix: &str) -> Option<String> {
    if !lower.starts_with(prefix) {
        return None;
    }
    let rest = original.get(prefix.len()..)?.trim();
    (!rest.is_empty()).then(|| rest.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Session reached `exit` or `emergency`; the caller should stop reading input.
    Finished,
}

/// One console conversation: owns the session state between turns and
/// presents every reply through a `TextToSpeech`.
pub struct Console<C: IntentPort, G: TextGenerator, T: TextToSpeech> {
    core: OrchestratorCore<C, G>,
    speaker: T,
    state: SessionState,
    json: bool,
}

impl<C: IntentPort, G: TextGenerator, T: TextToSpeech> Console<C, G, T> {
    /// Bootstraps the session and speaks the greeting.
    pub async fn start(
        core: OrchestratorCore<C, G>,
        speaker: T,
        profile: protocol::UserProfile,
        json: bool,
    ) -> Result<Self> {
        let outcome = core.bootstrap(profile)?;
        let state = outcome.state.clone();
        let console = Self { core, speaker, state, json };
        console.emit(&outcome).await?;
        Ok(console)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn speaker(&self) -> &T {
        &self.speaker
    }

    pub async fn handle_line(&mut self, line: &str) -> Result<Flow> {
        match Command::parse(line) {
            Command::Empty => {
                self.speaker.synthesize(REPROMPT).await?;
            }
            Command::Profile => {
                let profile = self.state.profile();
                let text = format!(
                    "Conditions: {}\nMedications: {}",
                    list_or_none(&profile.conditions),
                    list_or_none(&profile.medications)
                );
                self.speaker.synthesize(&text).await?;
            }
            Command::AddMedication(medication) => {
                self.state.add_medication(medication.clone());
                self.speaker.synthesize(&format!("Added medication: {}", medication)).await?;
            }
            Command::AddCondition(condition) => {
                self.state.add_condition(condition.clone());
                self.speaker.synthesize(&format!("Added condition: {}", condition)).await?;
            }
            Command::Reset => {
                let fresh = self.core.reset(self.state.clone());
                let outcome = self.core.process_turn(fresh, "").await?;
                self.state = outcome.state.clone();
                self.emit(&outcome).await?;
            }
            Command::Utterance(utterance) => {
                let outcome = self.core.process_turn(self.state.clone(), &utterance).await?;
                self.state = outcome.state.clone();
                self.emit(&outcome).await?;
                if self.state.stage().is_closed() {
                    return Ok(Flow::Finished);
                }
            }
        }
        Ok(Flow::Continue)
    }

    async fn emit(&self, outcome: &TurnOutcome) -> Result<()> {
        if self.json {
            let line = serde_json::to_string(&outcome.to_turn_reply())?;
            self.speaker.synthesize(&line).await
        } else {
            self.speaker.synthesize(&outcome.reply).await
        }
    }
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}
