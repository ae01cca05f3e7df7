//! Classifier trait

use async_trait::async_trait;
use automod_core::Verdict;

/// Trait for all safety classifiers
///
/// `classify` is infallible by contract: any failure inside an
/// implementation must surface as [`Verdict::unknown`], so message handling
/// is never interrupted by the classification service.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify the given text
    async fn classify(&self, text: &str) -> Verdict;

    /// Get the classifier name
    fn name(&self) -> &str;
}
