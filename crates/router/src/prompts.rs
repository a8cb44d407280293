use protocol::{Intent, Stage};

/// Categories the model may answer with, and the words that identify each one
/// inside a free-form reply.
const CATEGORIES: &[(Intent, &str, &[&str])] = &[
    (
        Intent::SymptomCheck,
        "User mentions symptoms, pain, sickness or how they feel",
        &["symptom_check", "symptom"],
    ),
    (
        Intent::MedicationReminder,
        "User asks about medication, pills, doses or prescriptions",
        &["medication_reminder", "medication"],
    ),
    (
        Intent::GeneralHealth,
        "General health questions about diet, exercise, sleep or wellness",
        &["general_health", "general"],
    ),
    (
        Intent::Emergency,
        "Urgent medical situation that needs immediate help",
        &["emergency"],
    ),
    (
        Intent::Greeting,
        "User is only saying hello or making small talk",
        &["greeting"],
    ),
];

/// Prompt for the fallback classification call.
pub fn classification_prompt(utterance: &str, stage: Stage, previous: Option<Intent>) -> String {
    let mut prompt = String::from("Classify the user's intent into ONE category.\n\nCategories:\n");
    for (intent, description, _) in CATEGORIES {
        prompt.push_str(&format!("- {}: {}\n", intent, description));
    }

    prompt.push_str(&format!("\n[STAGE: {}]\n", stage));
    match previous {
        Some(intent) => prompt.push_str(&format!("[PREVIOUS_TOPIC: {}]\n", intent)),
        None => prompt.push_str("[NO_PREVIOUS_TOPIC]\n"),
    }

    prompt.push_str(&format!("\nUser said: \"{}\"\n\nRespond with ONLY the category name.", utterance.trim()));
    prompt
}

/// Pull a category out of a model reply. The reply may wrap the name in extra words,
/// so categories are tried in a fixed order (symptom, medication, general,
/// emergency, greeting) and the first one named anywhere in the reply wins.
pub fn parse_category(reply: &str) -> Option<Intent> {
    let text = reply.to_lowercase();
    CATEGORIES
        .iter()
        .find(|(_, _, names)| names.iter().any(|name| text.contains(name)))
        .map(|(intent, _, _)| *intent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_every_category() {
        let prompt = classification_prompt("hmm, not sure", Stage::AwaitingChoice, None);
        for name in ["symptom_check", "medication_reminder", "general_health", "emergency", "greeting"] {
            assert!(prompt.contains(name), "missing {}", name);
        }
        assert!(prompt.contains("User said: \"hmm, not sure\""));
        assert!(prompt.contains("[NO_PREVIOUS_TOPIC]"));
    }

    #[test]
    fn test_prompt_carries_context() {
        let prompt = classification_prompt("what about it", Stage::Complete, Some(Intent::MedicationReminder));
        assert!(prompt.contains("[STAGE: complete]"));
        assert!(prompt.contains("[PREVIOUS_TOPIC: medication_reminder]"));
    }

    #[test]
    fn test_parse_tolerates_extra_words() {
        assert_eq!(parse_category("symptom_check"), Some(Intent::SymptomCheck));
        assert_eq!(parse_category("Category: Medication_Reminder."), Some(Intent::MedicationReminder));
        assert_eq!(parse_category("I think this is general health"), Some(Intent::GeneralHealth));
        assert_eq!(parse_category("EMERGENCY"), Some(Intent::Emergency));
        assert_eq!(parse_category("greeting"), Some(Intent::Greeting));
    }

    #[test]
    fn test_parse_uses_fixed_category_order() {
        assert_eq!(
            parse_category("This is not an emergency; it is general_health."),
            Some(Intent::GeneralHealth)
        );
        assert_eq!(parse_category("general health, maybe medication"), Some(Intent::MedicationReminder));
        assert_eq!(parse_category("emergency greeting"), Some(Intent::Emergency));
    }

    #[test]
    fn test_parse_unrecognized() {
        assert_eq!(parse_category("unclear"), None);
        assert_eq!(parse_category(""), None);
        assert_eq!(parse_category("I cannot help with that"), None);
    }
}
