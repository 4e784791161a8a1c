//! Unified error types for the crate.

use services::TransportError;
use thiserror::Error;

/// Top-level error for rag-store operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// Non-2xx status from the store, or no response at all.
    #[error("qdrant transport error: {0}")]
    Transport(#[from] TransportError),

    /// Response body without the expected fields/types.
    #[error("invalid response format, expected {expected}: {body}")]
    InvalidResponseFormat {
        /// Short description of the expected shape, e.g. `result[].payload.text`.
        expected: &'static str,
        /// Raw response body.
        body: String,
    },

    /// Request body or point payload could not be serialized.
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}
