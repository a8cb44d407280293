use llm::TextGenerator;
use protocol::{Intent, UserProfile};
use router::{is_bare_selection, KeywordRules};

use super::{HandlerContext, HandlerReply};
use crate::config::{DomainSpec, ProfileField};
use crate::session::{context_for_prompt, DialogueTurn};
use crate::state::HandlerOutcome;

/// One parameterised handler per domain intent (symptoms, medication, general health).
///
/// A detail round has two steps: `open` asks the fixed clarifying question, and
/// `continue_with` either asks again (bare selection, generator failure) or
/// produces the generated answer.
#[derive(Debug, Clone)]
pub struct DomainHandler {
    spec: DomainSpec,
    vocabulary: Vec<String>,
    max_words: usize,
    history_window: usize,
    voice_style: String,
}

impl DomainHandler {
    pub fn new(
        spec: DomainSpec,
        rules: &KeywordRules,
        max_words: usize,
        history_window: usize,
        voice_style: impl Into<String>,
    ) -> Self {
        let mut vocabulary = rules.selection_tokens(spec.intent);
        vocabulary.extend(spec.selection_words.iter().map(|w| w.to_lowercase()));
        Self { spec, vocabulary, max_words, history_window, voice_style: voice_style.into() }
    }

    pub fn intent(&self) -> Intent {
        self.spec.intent
    }

    /// Fresh entry: fixed prompt, no generator call, no history.
    pub fn open(&self) -> HandlerReply {
        HandlerReply::new(self.spec.clarifying_prompt.clone(), HandlerOutcome::AskForDetails)
    }

    pub fn is_bare_selection(&self, utterance: &str) -> bool {
        is_bare_selection(utterance, &self.vocabulary, self.max_words)
    }

    pub async fn continue_with<G: TextGenerator>(
        &self,
        ctx: HandlerContext<'_>,
        generator: &G,
    ) -> HandlerReply {
        if self.is_bare_selection(ctx.utterance) {
            tracing::debug!(
                intent = %self.spec.intent,
                words = ctx.utterance.split_whitespace().count(),
                "bare selection echo; asking again"
            );
            return HandlerReply::new(self.spec.clarifying_prompt.clone(), HandlerOutcome::RetryDetails);
        }

        let prompt = self.build_prompt(&ctx);
        match generator.generate(&prompt).await {
            Ok(answer) => {
                let text = self.with_disclaimer(answer.trim());
                let turn = DialogueTurn::new(self.spec.intent, ctx.utterance, text.clone());
                HandlerReply::new(text, HandlerOutcome::Answered).with_turn(turn)
            }
            Err(e) => {
                tracing::warn!(intent = %self.spec.intent, error = %e, "generation failed; using fallback reply");
                HandlerReply::new(self.spec.fallback_reply.clone(), HandlerOutcome::RetryDetails)
            }
        }
    }

    pub fn build_prompt(&self, ctx: &HandlerContext<'_>) -> String {
        let mut prompt = format!("{}\n\n", self.spec.persona);

        if let Some(line) = profile_line(self.spec.profile_field, ctx.profile) {
            prompt.push_str(&line);
            prompt.push('\n');
        }

        let history = context_for_prompt(ctx.history, self.history_window);
        if !history.is_empty() {
            prompt.push('\n');
            prompt.push_str(&history);
        }

        prompt.push_str(&format!("\nPatient says: \"{}\"\n\n", ctx.utterance));
        prompt.push_str(&format!("Respond in {}:\n", self.spec.answer_length));
        for instruction in &self.spec.instructions {
            prompt.push_str(&format!("- {}\n", instruction));
        }
        prompt.push('\n');
        prompt.push_str(&self.voice_style);
        if let Some(disclaimer) = &self.spec.disclaimer {
            prompt.push_str(&format!("\nEnd with exactly: \"{}\"", disclaimer));
        }
        prompt
    }

    fn with_disclaimer(&self, answer: &str) -> String {
        match &self.spec.disclaimer {
            Some(disclaimer) if !answer.contains(disclaimer.as_str()) => {
                format!("{} {}", answer, disclaimer)
            }
            _ => answer.to_string(),
        }
    }
}

fn profile_line(field: ProfileField, profile: &UserProfile) -> Option<String> {
    let (label, items) = match field {
        ProfileField::Conditions => ("Patient's known conditions", &profile.conditions),
        ProfileField::Medications => ("Patient's current medications", &profile.medications),
        ProfileField::None => return None,
    };
    let listed = if items.is_empty() { "none reported".to_string() } else { items.join(", ") };
    Some(format!("{}: {}", label, listed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoreConfig;
    use llm::mock::{FailingGenerator, ScriptedGenerator};
    use tracing_test::traced_test;

    fn handler(intent: Intent) -> DomainHandler {
        let config = CoreConfig::default();
        let spec = config.domain(intent).cloned().unwrap();
        DomainHandler::new(spec, &config.keywords, 5, 6, config.voice_style.clone())
    }

    fn profile() -> UserProfile {
        UserProfile::new(
            vec!["Type 2 Diabetes".to_string(), "Hypertension".to_string()],
            vec!["Metformin 500mg - twice daily".to_string()],
        )
    }

    #[test]
    fn test_bare_selection_heuristic() {
        let symptoms = handler(Intent::SymptomCheck);
        assert!(symptoms.is_bare_selection("1"));
        assert!(symptoms.is_bare_selection("option one please"));
        assert!(symptoms.is_bare_selection("symptom check"));
        assert!(!symptoms.is_bare_selection("my head hurts"));
        assert!(!symptoms.is_bare_selection("one one one one one"));

        let meds = handler(Intent::MedicationReminder);
        assert!(meds.is_bare_selection("2"));
        assert!(!meds.is_bare_selection("1"));
    }

    #[test]
    fn test_prompt_embeds_profile_field() {
        let profile = profile();
        let ctx = HandlerContext { utterance: "my feet tingle", profile: &profile, history: &[] };

        let prompt = handler(Intent::SymptomCheck).build_prompt(&ctx);
        assert!(prompt.contains("Type 2 Diabetes, Hypertension"));
        assert!(!prompt.contains("Metformin"));
        assert!(prompt.contains("Patient says: \"my feet tingle\""));
        assert!(prompt.contains("this is not a diagnosis"));

        let prompt = handler(Intent::MedicationReminder).build_prompt(&ctx);
        assert!(prompt.contains("Metformin 500mg"));
        assert!(!prompt.contains("Hypertension"));

        let prompt = handler(Intent::GeneralHealth).build_prompt(&ctx);
        assert!(!prompt.contains("Metformin") && !prompt.contains("Hypertension"));
    }

    #[test]
    fn test_prompt_includes_history() {
        let profile = profile();
        let history = vec![DialogueTurn::new(Intent::GeneralHealth, "how much water", "About eight glasses.")];
        let ctx = HandlerContext { utterance: "and when I exercise?", profile: &profile, history: &history };
        let prompt = handler(Intent::GeneralHealth).build_prompt(&ctx);
        assert!(prompt.contains("[User]: how much water"));
        assert!(prompt.contains("[Assistant]: About eight glasses."));
    }

    #[tokio::test]
    async fn test_answer_gets_disclaimer_and_history_entry() {
        let profile = profile();
        let ctx = HandlerContext { utterance: "sharp pain in my knee", profile: &profile, history: &[] };
        let generator = ScriptedGenerator::with_replies(["That sounds uncomfortable. Rest and ice may help."]);

        let reply = handler(Intent::SymptomCheck).continue_with(ctx, &generator).await;
        assert_eq!(reply.outcome, HandlerOutcome::Answered);
        assert!(reply.text.ends_with("Please consult a doctor if symptoms worsen."));
        let turn = reply.turn.unwrap();
        assert_eq!(turn.user, "sharp pain in my knee");
        assert_eq!(turn.assistant, reply.text);
    }

    #[tokio::test]
    async fn test_failure_uses_fallback() {
        let profile = profile();
        let ctx = HandlerContext { utterance: "I keep missing my evening dose", profile: &profile, history: &[] };
        let generator = FailingGenerator::new();

        let h = handler(Intent::MedicationReminder);
        let reply = h.continue_with(ctx, &generator).await;
        assert_eq!(reply.outcome, HandlerOutcome::RetryDetails);
        assert_eq!(reply.text, CoreConfig::default().domain(Intent::MedicationReminder).unwrap().fallback_reply);
        assert!(reply.turn.is_none());
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_bare_echo_skips_generator() {
        let profile = profile();
        let ctx = HandlerContext { utterance: "three", profile: &profile, history: &[] };
        let generator = ScriptedGenerator::new();

        let h = handler(Intent::GeneralHealth);
        let reply = h.continue_with(ctx, &generator).await;
        assert_eq!(reply.outcome, HandlerOutcome::RetryDetails);
        assert_eq!(reply.text, h.open().text);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_echo_log_has_word_count_not_text() {
        let profile = profile();
        let ctx = HandlerContext { utterance: "symptom checkup", profile: &profile, history: &[] };
        let reply = handler(Intent::SymptomCheck).continue_with(ctx, &ScriptedGenerator::new()).await;
        assert_eq!(reply.outcome, HandlerOutcome::RetryDetails);
        assert!(logs_contain("words=2"));
        assert!(!logs_contain("checkup"));
    }
}
