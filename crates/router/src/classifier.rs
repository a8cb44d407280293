use llm::TextGenerator;
use protocol::{Intent, Stage};
use serde::{Deserialize, Serialize};

use crate::keywords::KeywordRules;
use crate::prompts::{classification_prompt, parse_category};

/// What the classifier already knows about the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassificationContext {
    pub stage: Stage,
    pub previous_intent: Option<Intent>,
}

impl ClassificationContext {
    pub fn new(stage: Stage, previous_intent: Option<Intent>) -> Self {
        Self { stage, previous_intent }
    }
}

/// Which layer produced a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationSource {
    EmptyInput,
    ExitKeyword,
    EmergencyPhrase,
    Selection,
    Keyword,
    Model,
    ModelUnrecognized,
    ModelFailed,
}

impl ClassificationSource {
    pub fn used_model(&self) -> bool {
        matches!(
            self,
            ClassificationSource::Model
                | ClassificationSource::ModelUnrecognized
                | ClassificationSource::ModelFailed
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub intent: Intent,
    pub source: ClassificationSource,
}

impl Classification {
    fn new(intent: Intent, source: ClassificationSource) -> Self {
        Self { intent, source }
    }
}

/// Layered intent classifier: deterministic rules first, the model only as a fallback.
/// Never fails; anything the model cannot settle becomes `Intent::Unclear`.
pub struct IntentClassifier<G: TextGenerator> {
    rules: KeywordRules,
    generator: G,
}

impl<G: TextGenerator> IntentClassifier<G> {
    pub fn new(generator: G) -> Self {
        Self::with_rules(KeywordRules::default(), generator)
    }

    pub fn with_rules(rules: KeywordRules, generator: G) -> Self {
        Self { rules, generator }
    }

    pub fn rules(&self) -> &KeywordRules {
        &self.rules
    }

    /// Deterministic layers only, in contract order: exit, emergency, selection, buckets.
    pub fn classify_rules(&self, utterance: &str) -> Option<Classification> {
        if utterance.trim().is_empty() {
            return Some(Classification::new(Intent::Waiting, ClassificationSource::EmptyInput));
        }
        if self.rules.is_exit_command(utterance) {
            return Some(Classification::new(Intent::Exit, ClassificationSource::ExitKeyword));
        }
        if self.rules.mentions_emergency(utterance) {
            return Some(Classification::new(Intent::Emergency, ClassificationSource::EmergencyPhrase));
        }
        if let Some(intent) = self.rules.selection(utterance) {
            return Some(Classification::new(intent, ClassificationSource::Selection));
        }
        self.rules
            .bucket(utterance)
            .map(|intent| Classification::new(intent, ClassificationSource::Keyword))
    }

    pub async fn classify(&self, utterance: &str, context: &ClassificationContext) -> Classification {
        if let Some(hit) = self.classify_rules(utterance) {
            tracing::debug!(intent = %hit.intent, source = ?hit.source, "rule classification");
            return hit;
        }

        let prompt = classification_prompt(utterance, context.stage, context.previous_intent);
        let result = match self.generator.generate(&prompt).await {
            Ok(reply) => match parse_category(&reply) {
                Some(intent) => Classification::new(intent, ClassificationSource::Model),
                None => {
                    tracing::debug!(chars = reply.trim().len(), "model reply named no category");
                    Classification::new(Intent::Unclear, ClassificationSource::ModelUnrecognized)
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "classification call failed; treating as unclear");
                Classification::new(Intent::Unclear, ClassificationSource::ModelFailed)
            }
        };
        tracing::debug!(intent = %result.intent, source = ?result.source, "model classification");
        result
    }
}
