//! Prompt builder: fixed instructions + enumerated context block.

/// Instruction preamble placed before every prompt.
pub const DEFAULT_PREAMBLE: &str = "You are a helpful assistant. Answer the following question based on the provided context information.";

/// Lower bound of the word budget, so tiny token limits still get a usable answer.
pub const MIN_WORD_BUDGET: u32 = 20;

/// Heuristic words-per-token ratio used to turn a token limit into a word limit.
const WORDS_PER_TOKEN: f64 = 0.75;

/// Target answer length in words for a completion capped at `max_tokens`.
///
/// # Example
/// ```
/// use contextor::prompt::word_budget;
/// assert_eq!(word_budget(10), 20);
/// assert_eq!(word_budget(200), 150);
/// ```
pub fn word_budget(max_tokens: u32) -> u32 {
    let words = (f64::from(max_tokens) * WORDS_PER_TOKEN).floor() as u32;
    words.max(MIN_WORD_BUDGET)
}

/// Build the grounded prompt sent to the completion backend.
///
/// Contexts are numbered from 1 in the order given (the search ranking).
/// When `max_tokens` is set, the preamble asks the model to stay within
/// [`word_budget`] words and to finish its last sentence.
///
/// # Example
/// ```
/// use contextor::prompt::build_prompt;
/// let p = build_prompt("What is RAG?", &["RAG uses a vector database..."], None);
/// assert!(p.contains("[1] RAG uses a vector database...\n"));
/// assert!(p.ends_with("Question: What is RAG?\nAnswer: "));
/// ```
pub fn build_prompt<S: AsRef<str>>(question: &str, contexts: &[S], max_tokens: Option<u32>) -> String {
    let mut out = String::new();
    out.push_str(DEFAULT_PREAMBLE);
    if let Some(tokens) = max_tokens {
        out.push_str(&format!(
            " Keep the answer under about {} words and finish your last sentence.",
            word_budget(tokens)
        ));
    }
    out.push_str("\n\n");

    out.push_str("Context information:\n");
    for (i, ctx) in contexts.iter().enumerate() {
        out.push_str(&format!("[{}] {}\n", i + 1, ctx.as_ref()));
    }
    out.push('\n');

    out.push_str("Question: ");
    out.push_str(question);
    out.push('\n');
    out.push_str("Answer: ");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_budget_has_a_floor() {
        assert_eq!(word_budget(0), 20);
        assert_eq!(word_budget(10), 20);
        assert_eq!(word_budget(27), 20);
        assert_eq!(word_budget(200), 150);
        assert_eq!(word_budget(512), 384);
        assert_eq!(word_budget(201), 150);
    }

    #[test]
    fn prompt_layout_is_stable() {
        let p = build_prompt("Who?", &["first doc", "second doc"], Some(200));
        let expected = "You are a helpful assistant. Answer the following question based on the provided context information. \
Keep the answer under about 150 words and finish your last sentence.\n\n\
Context information:\n[1] first doc\n[2] second doc\n\nQuestion: Who?\nAnswer: ";
        assert_eq!(p, expected);
    }

    #[test]
    fn no_budget_sentence_without_max_tokens() {
        let p = build_prompt("Q", &["c"], None);
        assert!(!p.contains("Keep the answer"));
        assert!(p.starts_with(DEFAULT_PREAMBLE));
    }

    #[test]
    fn contexts_keep_ranking_order() {
        let docs = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let p = build_prompt("q", &docs, None);
        let a = p.find("[1] a").unwrap();
        let b = p.find("[2] b").unwrap();
        let c = p.find("[3] c").unwrap();
        assert!(a < b && b < c);
    }
}
