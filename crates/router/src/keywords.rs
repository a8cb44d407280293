use protocol::Intent;
use serde::{Deserialize, Serialize};

/// Words that may pad a bare menu selection without turning it into real detail.
pub const SELECTION_FILLER: &[&str] = &[
    "i", "i'd", "id", "want", "need", "like", "would", "the", "a", "an", "option", "number",
    "choice", "please", "pick", "choose", "select", "go", "with", "ok", "okay", "yes", "um", "uh",
];

/// Deterministic classification tables. Read-only once a classifier is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordRules {
    /// Matched against the whole trimmed utterance.
    pub exit_words: Vec<String>,
    /// Menu options 1..=4, each a digit plus its spoken and ordinal forms.
    pub selections: Vec<SelectionGroup>,
    /// Checked before selections and buckets.
    pub emergency_phrases: Vec<String>,
    /// Checked in order; the first bucket with any hit wins.
    pub buckets: Vec<KeywordBucket>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionGroup {
    pub intent: Intent,
    pub digit: String,
    pub words: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordBucket {
    pub intent: Intent,
    pub words: Vec<String>,
}

fn strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for KeywordRules {
    fn default() -> Self {
        Self {
            exit_words: strings(&["exit", "quit", "stop", "goodbye", "bye"]),
            selections: vec![
                SelectionGroup { intent: Intent::SymptomCheck, digit: "1".into(), words: strings(&["one", "first"]) },
                SelectionGroup { intent: Intent::MedicationReminder, digit: "2".into(), words: strings(&["two", "second"]) },
                SelectionGroup { intent: Intent::GeneralHealth, digit: "3".into(), words: strings(&["three", "third"]) },
                SelectionGroup { intent: Intent::Emergency, digit: "4".into(), words: strings(&["four", "fourth"]) },
            ],
            emergency_phrases: strings(&[
                "emergency",
                "urgent",
                "chest pain",
                "can't breathe",
                "cannot breathe",
                "can not breathe",
                "bleeding",
            ]),
            buckets: vec![
                KeywordBucket {
                    intent: Intent::SymptomCheck,
                    words: strings(&["symptom", "pain", "ache", "sick", "feel", "hurt", "headache", "fever", "cough"]),
                },
                KeywordBucket {
                    intent: Intent::MedicationReminder,
                    words: strings(&["medicine", "medication", "pill", "drug", "forgot", "dose", "prescription"]),
                },
                KeywordBucket {
                    intent: Intent::GeneralHealth,
                    words: strings(&["health", "food", "diet", "exercise", "sleep", "wellness", "tips"]),
                },
            ],
        }
    }
}

/// Lowercase and fold typographic apostrophes, which speech engines like to emit.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase().replace(&['\u{2019}', '\u{2018}'][..], "'")
}

/// Split into word tokens, keeping apostrophes inside words.
pub fn tokens(text: &str) -> Vec<String> {
    normalize(text)
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

impl KeywordRules {
    /// True when the whole utterance, minus trailing punctuation, is an exit word.
    pub fn is_exit_command(&self, utterance: &str) -> bool {
        let text = normalize(utterance);
        let text = text.trim_end_matches(|c: char| c.is_ascii_punctuation()).trim();
        !text.is_empty() && self.exit_words.iter().any(|w| w == text)
    }

    pub fn mentions_emergency(&self, utterance: &str) -> bool {
        let text = normalize(utterance);
        self.emergency_phrases.iter().any(|p| text.contains(p.as_str()))
    }

    /// Menu selection, checked strictly in option order so the lowest option wins.
    /// Digits and spoken forms both match anywhere in the utterance.
    pub fn selection(&self, utterance: &str) -> Option<Intent> {
        let text = normalize(utterance);
        self.selections
            .iter()
            .find(|group| {
                text.contains(group.digit.as_str())
                    || group.words.iter().any(|w| text.contains(w.as_str()))
            })
            .map(|group| group.intent)
    }

    pub fn bucket(&self, utterance: &str) -> Option<Intent> {
        let text = normalize(utterance);
        self.buckets
            .iter()
            .find(|bucket| bucket.words.iter().any(|w| text.contains(w.as_str())))
            .map(|bucket| bucket.intent)
    }

    /// Digit and spoken forms of the menu option bound to `intent`.
    pub fn selection_tokens(&self, intent: Intent) -> Vec<String> {
        self.selections
            .iter()
            .filter(|group| group.intent == intent)
            .flat_map(|group| std::iter::once(group.digit.clone()).chain(group.words.iter().cloned()))
            .collect()
    }
}

/// A short utterance made only of selection vocabulary counts as a bare menu pick,
/// not as detail. Empty input is bare too.
pub fn is_bare_selection(utterance: &str, vocabulary: &[String], max_words: usize) -> bool {
    let words = tokens(utterance);
    if words.len() >= max_words {
        return false;
    }
    words.iter().all(|w| {
        vocabulary.iter().any(|v| v == w) || SELECTION_FILLER.contains(&w.as_str())
    })
}
