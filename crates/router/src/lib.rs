pub mod classifier;
pub mod keywords;
pub mod prompts;

pub use classifier::{Classification, ClassificationContext, ClassificationSource, IntentClassifier};
pub use keywords::{is_bare_selection, KeywordBucket, KeywordRules, SelectionGroup};
