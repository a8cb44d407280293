use anyhow::Context;
use protocol::Intent;
use router::KeywordRules;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CoreError, CoreResult};

/// Which part of the profile a domain prompt embeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    Conditions,
    Medications,
    None,
}

/// Everything that distinguishes one generative handler from another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainSpec {
    pub intent: Intent,
    /// Fixed prompt that opens the detail round.
    pub clarifying_prompt: String,
    /// Spoken when the generator fails; the detail round repeats.
    pub fallback_reply: String,
    pub persona: String,
    pub profile_field: ProfileField,
    /// e.g. "3-4 sentences"
    pub answer_length: String,
    pub instructions: Vec<String>,
    /// Appended to the answer when the model leaves it out.
    #[serde(default)]
    pub disclaimer: Option<String>,
    /// Words that, with the option number, make up a bare menu selection.
    #[serde(default)]
    pub selection_words: Vec<String>,
}

/// Read-only texts and tables shared by every session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub greeting_intro: String,
    pub unclear_intro: String,
    pub menu: String,
    pub goodbye: String,
    pub emergency_message: String,
    pub voice_style: String,
    pub domains: Vec<DomainSpec>,
    /// Utterances with fewer words than this can count as a bare selection.
    pub bare_selection_max_words: usize,
    /// Exchanges rendered into handler prompts.
    pub history_window: usize,
    pub keywords: KeywordRules,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            greeting_intro: "Hello! I'm your Medical Voice Assistant.".to_string(),
            unclear_intro: "I didn't quite understand that.".to_string(),
            menu: "I can help you with:\n\
                   1. Symptom check - talk through how you're feeling\n\
                   2. Medication help - questions about your medicines\n\
                   3. Health advice - general tips on diet, sleep and exercise\n\
                   4. Emergency - urgent medical guidance\n\n\
                   Please tell me which service you need."
                .to_string(),
            goodbye: "Take care of your health! Goodbye!".to_string(),
            emergency_message: "This sounds like a medical emergency. Please call 911 or your local \
                                emergency number right now. Do not drive yourself. Stay calm and wait \
                                for help to arrive. This needs urgent medical attention."
                .to_string(),
            voice_style: "Keep it SHORT and CONVERSATIONAL for voice output. Do not use lists, \
                          headings or markdown."
                .to_string(),
            domains: vec![
                DomainSpec {
                    intent: Intent::SymptomCheck,
                    clarifying_prompt: "Great! I'll help with your symptoms. Please describe what \
                                        you're experiencing and when it started."
                        .to_string(),
                    fallback_reply: "I'm having trouble analyzing that right now. Could you describe \
                                     your symptoms again?"
                        .to_string(),
                    persona: "You are a caring medical assistant analyzing symptoms.".to_string(),
                    profile_field: ProfileField::Conditions,
                    answer_length: "3-4 sentences".to_string(),
                    instructions: strings(&[
                        "Acknowledge their concern with empathy",
                        "Explain possible common causes",
                        "Suggest self-care if appropriate",
                        "Advise when to see a doctor",
                    ]),
                    disclaimer: Some(
                        "Remember, this is not a diagnosis. Please consult a doctor if symptoms worsen."
                            .to_string(),
                    ),
                    selection_words: strings(&["symptom", "symptoms", "check", "checker", "checkup"]),
                },
                DomainSpec {
                    intent: Intent::MedicationReminder,
                    clarifying_prompt: "Sure, let's talk about your medications. What would you like \
                                        to know, or which medicine do you need help with?"
                        .to_string(),
                    fallback_reply: "I understand medication management can be challenging. Could you \
                                     tell me again what you need help with?"
                        .to_string(),
                    persona: "You are a supportive medication management assistant.".to_string(),
                    profile_field: ProfileField::Medications,
                    answer_length: "2-3 sentences".to_string(),
                    instructions: strings(&[
                        "Acknowledge their situation",
                        "Provide helpful medication advice",
                        "Encourage adherence",
                    ]),
                    disclaimer: None,
                    selection_words: strings(&[
                        "medication", "medications", "medicine", "medicines", "help", "reminder",
                        "reminders",
                    ]),
                },
                DomainSpec {
                    intent: Intent::GeneralHealth,
                    clarifying_prompt: "Happy to help with general health. What would you like to \
                                        know about?"
                        .to_string(),
                    fallback_reply: "That's a great question! Could you ask it once more, maybe a \
                                     little more specifically?"
                        .to_string(),
                    persona: "You are a knowledgeable health advisor.".to_string(),
                    profile_field: ProfileField::None,
                    answer_length: "2-3 sentences".to_string(),
                    instructions: strings(&[
                        "Answer their question directly",
                        "Give actionable tips",
                        "Keep it simple",
                    ]),
                    disclaimer: None,
                    selection_words: strings(&["general", "health", "advice", "tips", "question"]),
                },
            ],
            bare_selection_max_words: 5,
            history_window: 6,
            keywords: KeywordRules::default(),
        }
    }
}

impl CoreConfig {
    /// Load a JSON override; missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read core config {}", path.display()))?;
        let config: CoreConfig = serde_json::from_str(&content)
            .with_context(|| format!("parse core config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Every domain intent needs exactly one spec, and only domain intents may have one.
    pub fn validate(&self) -> CoreResult<()> {
        for spec in &self.domains {
            if !spec.intent.is_domain() {
                return Err(CoreError::InvalidDetailOwner(spec.intent));
            }
        }
        for intent in Intent::ALL.iter().filter(|i| i.is_domain()) {
            if self.domain(*intent).is_none() {
                return Err(CoreError::MissingHandler(*intent));
            }
        }
        Ok(())
    }

    pub fn domain(&self, intent: Intent) -> Option<&DomainSpec> {
        self.domains.iter().find(|spec| spec.intent == intent)
    }

    pub fn greeting_reply(&self) -> String {
        format!("{}\n\n{}", self.greeting_intro, self.menu)
    }

    /// Menu re-display used for unclear input.
    pub fn unclear_reply(&self) -> String {
        format!("{}\n\n{}", self.unclear_intro, self.menu)
    }
}
