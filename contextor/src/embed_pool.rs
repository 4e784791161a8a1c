//! Embedding executor with bounded concurrency and order preservation.

use ai_llm_service::{AiLlmError, EmbeddingService};
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info};

use crate::progress::Progress;

/// Embeds `texts` in input order.
///
/// At most `concurrency` requests are in flight (`0` is treated as `1`).
/// Results come back in the order of `texts` regardless of completion order.
/// The first failure aborts the batch; requests not yet issued are never sent.
///
/// # Errors
/// Returns the first [`AiLlmError`] produced by the embedder.
pub async fn embed_all<S>(
    embedder: &EmbeddingService,
    texts: &[S],
    concurrency: usize,
    progress: &dyn Progress,
) -> Result<Vec<Vec<f32>>, AiLlmError>
where
    S: AsRef<str> + Sync,
{
    info!(
        "embed_pool::embed_all: total={} concurrency={}",
        texts.len(),
        concurrency
    );

    let vectors: Vec<Vec<f32>> = stream::iter(texts.iter().enumerate())
        .map(|(i, text)| async move {
            let v = embedder.embed(text.as_ref()).await?;
            progress.step(&format!("embedded document {i}"));
            Ok::<_, AiLlmError>(v)
        })
        .buffered(concurrency.max(1))
        .try_collect()
        .await?;

    debug!("embed_pool::embed_all: {} embeddings ready", vectors.len());
    Ok(vectors)
}
