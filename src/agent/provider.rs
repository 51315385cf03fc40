//! The answer provider abstraction.

use crate::errors::InsightError;
use async_trait::async_trait;

/// Something that answers natural-language questions about the dataset.
#[async_trait]
pub trait AnswerProvider: Send + Sync {
    /// Answer `question`, optionally grounded in a dataset description.
    async fn answer(&self, question: &str, context: Option<&str>) -> Result<String, InsightError>;

    /// Model identifier, for logging and report metadata.
    fn model_name(&self) -> &str;
}

/// Combine the dataset context and the question into a single prompt.
pub fn build_prompt(question: &str, context: Option<&str>) -> String {
    match context {
        Some(context) if !context.is_empty() => {
            format!("Context:\n{}\n\nQuestion:\n{}", context, question)
        }
        _ => question.to_string(),
    }
}

/// Provider used for dry runs: answers every question with a fixed note and
/// never touches the network.
pub struct OfflineProvider;

pub const OFFLINE_ANSWER: &str = "(dry run: AI analysis skipped)";

#[async_trait]
impl AnswerProvider for OfflineProvider {
    async fn answer(
        &self,
        _question: &str,
        _context: Option<&str>,
    ) -> Result<String, InsightError> {
        Ok(OFFLINE_ANSWER.to_string())
    }

    fn model_name(&self) -> &str {
        "offline"
    }
}
