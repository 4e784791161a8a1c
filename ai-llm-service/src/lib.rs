//! Embedding and completion clients for the RAG pipeline.
//!
//! Both clients talk to their backend through a [`services::Transport`], so
//! the base URL, HTTP stack and test doubles are decided by the caller.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::{CompletionService, EmbeddingService};
//! use services::ReqwestTransport;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let embedder = EmbeddingService::new(Arc::new(ReqwestTransport::new("http://localhost:8081")?));
//! let llm = CompletionService::new(Arc::new(ReqwestTransport::new("http://localhost:8080")?));
//!
//! let v = embedder.embed("Ferris is a friendly crab.").await?;
//! println!("dim = {}", v.len());
//! println!("{}", llm.generate_completion("Say hi.", 32).await?);
//! # Ok(()) }
//! ```

pub mod error_handler;
pub mod providers;
pub mod telemetry;

pub use error_handler::{AiLlmError, Result};
pub use providers::completion_service::{COMPLETION_TEMPERATURE, CompletionService};
pub use providers::embedding_service::EmbeddingService;
