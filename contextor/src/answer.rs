//! Answer generation and post-processing.

use ai_llm_service::{AiLlmError, CompletionService};
use tracing::debug;

use crate::prompt::build_prompt;

const SENTENCE_END: [char; 3] = ['.', '!', '?'];

/// Cut a raw completion back to its last complete sentence.
///
/// Trailing whitespace is removed first. Text already ending in `.`, `!` or
/// `?` is returned as is; otherwise everything after the last such mark is
/// dropped. Text without any sentence-ending mark is returned trimmed.
///
/// # Example
/// ```
/// use contextor::answer::trim_to_last_sentence;
/// assert_eq!(trim_to_last_sentence("The cat sat. It purred"), "The cat sat.");
/// ```
pub fn trim_to_last_sentence(text: &str) -> &str {
    let trimmed = text.trim_end();
    if trimmed.ends_with(SENTENCE_END) {
        return trimmed;
    }
    match trimmed.rfind(SENTENCE_END) {
        // All marks are ASCII, so `pos + 1` is a char boundary.
        Some(pos) => &trimmed[..pos + 1],
        None => trimmed,
    }
}

/// Prompt -> completion -> trimmed answer.
#[derive(Clone)]
pub struct LlmAnswerer {
    completion: CompletionService,
    max_tokens: u32,
}

impl LlmAnswerer {
    pub fn new(completion: CompletionService, max_tokens: u32) -> Self {
        Self {
            completion,
            max_tokens,
        }
    }

    /// Answer `question` grounded on `contexts` (best match first).
    pub async fn generate_answer<S: AsRef<str>>(
        &self,
        question: &str,
        contexts: &[S],
    ) -> Result<String, AiLlmError> {
        let prompt = build_prompt(question, contexts, Some(self.max_tokens));
        debug!(prompt_len = prompt.len(), contexts = contexts.len(), "prompt built");

        let raw = self
            .completion
            .generate_completion(&prompt, self.max_tokens)
            .await?;
        Ok(trim_to_last_sentence(&raw).to_string())
    }
}
