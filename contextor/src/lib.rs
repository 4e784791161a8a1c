//! Retrieval-augmented question answering over a Qdrant collection.
//!
//! [`Pipeline::ingest`] embeds a document corpus and rebuilds the collection
//! from scratch. [`Pipeline::answer`] embeds a question, retrieves the top
//! matches, builds a grounded prompt, asks the completion backend and trims
//! the reply to its last complete sentence.

pub mod answer;
pub mod cfg;
mod embed_pool;
mod error;
mod pipeline;
mod progress;
pub mod prompt;

mod api_types;

pub use answer::LlmAnswerer;
pub use api_types::{IngestReport, QaAnswer};
pub use cfg::ContextorConfig;
pub use error::{ConfigError, ContextorError};
pub use pipeline::Pipeline;
pub use progress::{IndicatifProgress, NoopProgress, Progress};
