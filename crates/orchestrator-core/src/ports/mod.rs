use async_trait::async_trait;
use llm::TextGenerator;
use router::{Classification, ClassificationContext, IntentClassifier};

pub use llm::TextGenerator as GeneratorPort;

/// Classification seam of the orchestrator. Implementations must not fail:
/// anything they cannot settle is reported as `Intent::Unclear`.
#[async_trait]
pub trait IntentPort: Send + Sync {
    async fn classify(&self, utterance: &str, context: ClassificationContext) -> Classification;
}

#[async_trait]
impl<G: TextGenerator> IntentPort for IntentClassifier<G> {
    async fn classify(&self, utterance: &str, context: ClassificationContext) -> Classification {
        IntentClassifier::classify(self, utterance, &context).await
    }
}

#[async_trait]
impl<T: IntentPort + ?Sized> IntentPort for std::sync::Arc<T> {
    async fn classify(&self, utterance: &str, context: ClassificationContext) -> Classification {
        (**self).classify(utterance, context).await
    }
}
