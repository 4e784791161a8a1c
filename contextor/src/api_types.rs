//! Public result types returned by [`crate::Pipeline`].

use rag_store::SearchHit;

/// Final answer together with the exact context passed to the model.
///
/// # Example
/// ```
/// use contextor::QaAnswer;
/// use rag_store::SearchHit;
/// let qa = QaAnswer {
///     answer: "RAG grounds answers in retrieved documents.".into(),
///     context: vec![SearchHit { id: 0, score: 0.98, text: "RAG uses a vector database...".into() }],
/// };
/// assert_eq!(qa.context[0].id, 0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct QaAnswer {
    pub answer: String,
    /// Hits in ranking order; `context[i]` was rendered as `[i + 1]` in the prompt.
    pub context: Vec<SearchHit>,
}

/// Outcome of a completed ingestion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngestReport {
    pub collection: String,
    /// Points written, ids `0..points`.
    pub points: usize,
    /// Vector size the collection was created with.
    pub dimension: usize,
    /// `true` when an existing collection was deleted first.
    pub recreated: bool,
}
