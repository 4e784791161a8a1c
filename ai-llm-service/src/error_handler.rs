//! Unified error handling for `ai-llm-service`.
//!
//! Two failure kinds come out of the backend clients: the transport reported
//! a non-success status (or no response at all), or the body did not have the
//! expected shape. Both carry the raw body so the caller can log it.
//!
//! All messages include the prefix `[AI LLM Service]` to simplify attribution in logs.

use services::TransportError;
use thiserror::Error;

/* ------------------------------------------------------------------------- */
/* Public result alias                                                       */
/* ------------------------------------------------------------------------- */

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, AiLlmError>;

/* ------------------------------------------------------------------------- */
/* Top-level error                                                           */
/* ------------------------------------------------------------------------- */

/// Top-level error for the `ai-llm-service` crate.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AiLlmError {
    /// Non-2xx status or connection failure, propagated unchanged.
    #[error("[AI LLM Service] {0}")]
    Transport(#[from] TransportError),

    /// Body parsed (or failed to parse) without the expected fields.
    #[error("[AI LLM Service] invalid response format, expected {expected}: {body}")]
    InvalidResponseFormat {
        /// Short description of the expected shape, e.g. `data[0].embedding`.
        expected: &'static str,
        /// Raw response body.
        body: String,
    },

    /// Request body could not be serialized.
    #[error("[AI LLM Service] failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
}

impl AiLlmError {
    pub(crate) fn invalid_format(expected: &'static str, body: impl Into<String>) -> Self {
        Self::InvalidResponseFormat {
            expected,
            body: body.into(),
        }
    }
}

/// Shortens a response body for single-line log fields.
pub fn make_snippet(body: &str) -> String {
    const MAX: usize = 256;
    let trimmed = body.trim();
    if trimmed.len() <= MAX {
        return trimmed.to_string();
    }
    let mut end = MAX;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &trimmed[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_is_bounded_and_char_safe() {
        let long = "é".repeat(400);
        let s = make_snippet(&long);
        assert!(s.ends_with('…'));
        assert!(s.len() <= 256 + '…'.len_utf8());
        assert_eq!(make_snippet("  short  "), "short");
    }

    #[test]
    fn invalid_format_message_includes_body() {
        let err = AiLlmError::invalid_format("choices[0].text", "{}");
        assert!(err.to_string().contains("choices[0].text"));
        assert!(err.to_string().ends_with("{}"));
    }
}
