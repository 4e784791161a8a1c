//! Typed errors for the contextor crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextorError {
    /// Embedding or completion backend failure.
    #[error("LLM service error: {0}")]
    Llm(#[from] ai_llm_service::AiLlmError),

    /// Vector store failure.
    #[error("RAG error: {0}")]
    Rag(#[from] rag_store::RagError),

    /// HTTP client could not be created.
    #[error("HTTP error: {0}")]
    Transport(#[from] services::TransportError),

    /// The env file could not be loaded.
    #[error("env file error: {0}")]
    EnvFile(#[from] services::EnvFileError),

    /// A config value was present but invalid.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Ingestion needs at least one document to size the collection.
    #[error("nothing to ingest: the document corpus is empty")]
    EmptyCorpus,
}

/// Errors raised while turning an env file into [`crate::ContextorConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid number in {var}: {reason}")]
    InvalidNumber {
        var: &'static str,
        reason: &'static str,
    },

    #[error("invalid format in {var}: {reason}")]
    InvalidFormat {
        var: &'static str,
        reason: &'static str,
    },

    #[error("{var} is out of range: {detail}")]
    OutOfRange {
        var: &'static str,
        detail: &'static str,
    },
}
