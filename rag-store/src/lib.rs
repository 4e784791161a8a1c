//! Vector-store access for the RAG pipeline over Qdrant's REST API.
//!
//! This crate provides:
//! - [`QdrantFacade`]: collection lifecycle (create/probe/delete), point
//!   upserts and deletes, and similarity search
//! - [`VectorPoint`] / [`SearchHit`]: the records flowing in and out
//!
//! With the `testing` feature, [`testing::InMemoryQdrant`] offers an
//! in-process store speaking the same JSON contract.

mod config;
mod errors;
mod qdrant_facade;
mod record;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::{DistanceKind, VectorSpace};
pub use errors::RagError;
pub use qdrant_facade::QdrantFacade;
pub use record::{SearchHit, TextPayload, VectorPoint};
