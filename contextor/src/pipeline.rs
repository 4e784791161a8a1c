//! Ingestion and question answering over one Qdrant collection.

use std::sync::Arc;
use std::time::Instant;

use ai_llm_service::{CompletionService, EmbeddingService};
use rag_store::{QdrantFacade, SearchHit, VectorPoint};
use services::ReqwestTransport;
use tracing::{info, warn};

use crate::answer::LlmAnswerer;
use crate::api_types::{IngestReport, QaAnswer};
use crate::cfg::ContextorConfig;
use crate::embed_pool::embed_all;
use crate::error::ContextorError;
use crate::progress::Progress;

/// Wires the embedder, the vector store and the answerer together.
#[derive(Clone)]
pub struct Pipeline {
    embedder: EmbeddingService,
    store: QdrantFacade,
    answerer: LlmAnswerer,
    collection: String,
    top_k: u64,
    embedding_concurrency: usize,
}

impl Pipeline {
    pub fn new(
        embedder: EmbeddingService,
        store: QdrantFacade,
        completion: CompletionService,
        cfg: &ContextorConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            answerer: LlmAnswerer::new(completion, cfg.max_tokens),
            collection: cfg.collection.clone(),
            top_k: cfg.top_k,
            embedding_concurrency: cfg.embedding_concurrency,
        }
    }

    /// Build HTTP clients for the three backends named in `cfg`.
    pub fn from_config(cfg: &ContextorConfig) -> Result<Self, ContextorError> {
        let embedder = EmbeddingService::new(Arc::new(ReqwestTransport::new(&cfg.embedder_service_url)?));
        let store = QdrantFacade::new(Arc::new(ReqwestTransport::new(&cfg.vector_db_url)?));
        let completion = CompletionService::new(Arc::new(ReqwestTransport::new(&cfg.llm_service_url)?));
        info!(
            llm = %cfg.llm_service_url,
            embedder = %cfg.embedder_service_url,
            vector_db = %cfg.vector_db_url,
            collection = %cfg.collection,
            "pipeline configured"
        );
        Ok(Self::new(embedder, store, completion, cfg))
    }

    /// Replace the collection contents with `documents`.
    ///
    /// Every document is embedded first (ids `0..n` in corpus order). Then
    /// the collection is probed, deleted if it exists, created with the
    /// dimensionality of the first vector, and filled with a single upsert.
    ///
    /// # Errors
    /// - [`ContextorError::EmptyCorpus`] if `documents` is empty
    /// - [`ContextorError::Llm`] if any embedding fails; nothing is written
    /// - [`ContextorError::Rag`] if a store call fails. A failed upsert
    ///   leaves the freshly created collection in place.
    pub async fn ingest<S>(
        &self,
        documents: &[S],
        progress: &dyn Progress,
    ) -> Result<IngestReport, ContextorError>
    where
        S: AsRef<str> + Sync,
    {
        if documents.is_empty() {
            return Err(ContextorError::EmptyCorpus);
        }
        let started = Instant::now();

        progress.set_total(documents.len() as u64);
        progress.message("embedding documents");
        let vectors = embed_all(
            &self.embedder,
            documents,
            self.embedding_concurrency,
            progress,
        )
        .await?;

        let points = vectors
            .into_iter()
            .zip(documents)
            .enumerate()
            .map(|(id, (vector, doc))| VectorPoint::with_text(id as u64, vector, doc.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let dimension = points
            .first()
            .map(VectorPoint::dimension)
            .ok_or(ContextorError::EmptyCorpus)?;

        progress.message("preparing collection");
        let recreated = self.store.collection_exists(&self.collection).await?;
        if recreated {
            warn!(collection = %self.collection, "collection exists, deleting before re-ingest");
            self.store.delete_collection(&self.collection).await?;
        }
        self.store
            .create_collection(&self.collection, dimension)
            .await?;

        progress.message("upserting points");
        self.store.upsert_points(&self.collection, &points).await?;
        progress.finish("ingestion complete");

        info!(
            collection = %self.collection,
            points = points.len(),
            dimension,
            recreated,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "ingestion complete"
        );

        Ok(IngestReport {
            collection: self.collection.clone(),
            points: points.len(),
            dimension,
            recreated,
        })
    }

    /// Embed `question` and fetch the `top_k` nearest documents.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<SearchHit>, ContextorError> {
        let query_vector = self.embedder.embed(question).await?;
        let hits = self
            .store
            .search_similar(&self.collection, &query_vector, self.top_k)
            .await?;
        Ok(hits)
    }

    /// Generate an answer grounded on already retrieved `hits`.
    ///
    /// Returns `Ok(None)` without calling the completion backend when `hits`
    /// is empty.
    pub async fn answer_with_hits(
        &self,
        question: &str,
        hits: Vec<SearchHit>,
    ) -> Result<Option<QaAnswer>, ContextorError> {
        if hits.is_empty() {
            info!(collection = %self.collection, "no relevant documents found, skipping generation");
            return Ok(None);
        }

        let contexts: Vec<&str> = hits.iter().map(|h| h.text.as_str()).collect();
        let answer = self.answerer.generate_answer(question, &contexts).await?;
        Ok(Some(QaAnswer {
            answer,
            context: hits,
        }))
    }

    /// Retrieve context for `question` and answer it.
    ///
    /// # Example
    /// ```no_run
    /// # use contextor::{ContextorConfig, Pipeline};
    /// # #[tokio::main] async fn main() -> Result<(), contextor::ContextorError> {
    /// let pipeline = Pipeline::from_config(&ContextorConfig::default())?;
    /// match pipeline.answer("What is RAG?").await? {
    ///     Some(qa) => println!("{}", qa.answer),
    ///     None => println!("No relevant documents found."),
    /// }
    /// # Ok(()) }
    /// ```
    pub async fn answer(&self, question: &str) -> Result<Option<QaAnswer>, ContextorError> {
        let hits = self.retrieve(question).await?;
        self.answer_with_hits(question, hits).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoopProgress;
    use ai_llm_service::AiLlmError;
    use rag_store::RagError;
    use rag_store::testing::InMemoryQdrant;
    use serde_json::{Value, json};
    use services::testing::ScriptedTransport;
    use services::{HttpResponse, TransportError};

    const RAG_DOC: &str = "RAG uses a vector database...";
    const CAT_DOC: &str = "The cat is on the roof.";

    /// Deterministic embedder: RAG-related inputs map near `[1, 0, 0]`,
    /// everything else near `[0, 1, 0]`.
    fn topic_embedder() -> ScriptedTransport {
        ScriptedTransport::new(|req| {
            let body: Value = serde_json::from_str(req.body.as_deref().unwrap_or("{}")).unwrap();
            let input = body["input"].as_str().unwrap_or_default();
            let v = if input == RAG_DOC || input == "What is RAG?" {
                [1.0, 0.0, 0.0]
            } else {
                [0.0, 1.0, 0.25]
            };
            HttpResponse::new(200, json!({"data": [{"embedding": v}]}).to_string())
        })
    }

    fn completion(text: &str) -> ScriptedTransport {
        ScriptedTransport::replying(200, json!({"choices": [{"text": text}]}).to_string())
    }

    fn pipeline(
        embedder: &ScriptedTransport,
        store: &InMemoryQdrant,
        llm: &ScriptedTransport,
    ) -> Pipeline {
        Pipeline::new(
            EmbeddingService::new(Arc::new(embedder.clone())),
            QdrantFacade::new(Arc::new(store.clone())),
            CompletionService::new(Arc::new(llm.clone())),
            &ContextorConfig::default(),
        )
    }

    #[tokio::test]
    async fn fresh_ingest_does_not_delete() {
        let store = InMemoryQdrant::default();
        let p = pipeline(&topic_embedder(), &store, &completion("x."));

        let report = p.ingest(&[RAG_DOC, CAT_DOC], &NoopProgress).await.unwrap();

        assert_eq!(
            report,
            IngestReport {
                collection: "test_collection".into(),
                points: 2,
                dimension: 3,
                recreated: false,
            }
        );
        assert_eq!(
            store.routes(),
            vec![
                "GET /collections/test_collection",
                "PUT /collections/test_collection",
                "PUT /collections/test_collection/points",
            ]
        );
        assert_eq!(store.point_count("test_collection"), Some(2));
    }

    #[tokio::test]
    async fn existing_collection_is_deleted_once_before_create() {
        let store = InMemoryQdrant::default();
        let p = pipeline(&topic_embedder(), &store, &completion("x."));
        p.ingest(&[RAG_DOC, CAT_DOC, "third"], &NoopProgress)
            .await
            .unwrap();

        let report = p.ingest(&[RAG_DOC, CAT_DOC], &NoopProgress).await.unwrap();
        assert!(report.recreated);

        let routes = store.routes();
        let second_run = &routes[3..];
        assert_eq!(
            second_run,
            [
                "GET /collections/test_collection",
                "DELETE /collections/test_collection",
                "PUT /collections/test_collection",
                "PUT /collections/test_collection/points",
            ]
        );
        assert_eq!(store.point_count("test_collection"), Some(2));
    }

    #[tokio::test]
    async fn unexpected_probe_status_creates_without_delete() {
        for probe_status in [204, 500] {
            let store = ScriptedTransport::new(move |req| {
                if req.method.as_str() == "GET" {
                    HttpResponse::new(probe_status, "")
                } else {
                    HttpResponse::new(200, r#"{"result":true,"status":"ok"}"#)
                }
            });
            let p = Pipeline::new(
                EmbeddingService::new(Arc::new(topic_embedder())),
                QdrantFacade::new(Arc::new(store.clone())),
                CompletionService::new(Arc::new(completion("x."))),
                &ContextorConfig::default(),
            );

            let report = p.ingest(&[RAG_DOC, CAT_DOC], &NoopProgress).await.unwrap();

            assert!(!report.recreated);
            assert_eq!(
                store.routes(),
                vec![
                    "GET /collections/test_collection",
                    "PUT /collections/test_collection",
                    "PUT /collections/test_collection/points",
                ],
                "probe status {probe_status}"
            );
        }
    }

    #[tokio::test]
    async fn empty_corpus_is_rejected_before_any_call() {
        let embedder = topic_embedder();
        let store = InMemoryQdrant::default();
        let p = pipeline(&embedder, &store, &completion("x."));

        let docs: Vec<String> = Vec::new();
        let err = p.ingest(&docs, &NoopProgress).await.unwrap_err();

        assert!(matches!(err, ContextorError::EmptyCorpus));
        assert!(embedder.calls().is_empty());
        assert!(store.routes().is_empty());
    }

    #[tokio::test]
    async fn embedding_failure_writes_nothing() {
        let embedder = ScriptedTransport::replying(503, "loading model");
        let store = InMemoryQdrant::default();
        let p = pipeline(&embedder, &store, &completion("x."));

        let err = p.ingest(&[RAG_DOC], &NoopProgress).await.unwrap_err();

        assert!(matches!(
            err,
            ContextorError::Llm(AiLlmError::Transport(TransportError::Status { status: 503, .. }))
        ));
        assert!(store.routes().is_empty());
    }

    #[tokio::test]
    async fn mixed_dimensions_fail_at_the_store() {
        let embedder = ScriptedTransport::new(|req| {
            let body: Value = serde_json::from_str(req.body.as_deref().unwrap_or("{}")).unwrap();
            let v: Vec<f32> = if body["input"] == "short" {
                vec![1.0, 0.0]
            } else {
                vec![1.0, 0.0, 0.0]
            };
            HttpResponse::new(200, json!({"data": [{"embedding": v}]}).to_string())
        });
        let store = InMemoryQdrant::default();
        let p = pipeline(&embedder, &store, &completion("x."));

        let err = p.ingest(&["long", "short"], &NoopProgress).await.unwrap_err();

        assert!(matches!(
            err,
            ContextorError::Rag(RagError::Transport(TransportError::Status { status: 400, .. }))
        ));
        // Created collection stays behind empty.
        assert_eq!(store.point_count("test_collection"), Some(0));
    }

    #[tokio::test]
    async fn malformed_query_embedding_skips_search() {
        let embedder = ScriptedTransport::replying(200, r#"{"object":"list"}"#);
        let store = InMemoryQdrant::default();
        let llm = completion("x.");
        let p = pipeline(&embedder, &store, &llm);

        let err = p.answer("What is RAG?").await.unwrap_err();

        assert!(matches!(
            err,
            ContextorError::Llm(AiLlmError::InvalidResponseFormat { .. })
        ));
        assert!(store.routes().is_empty());
        assert!(llm.calls().is_empty());
    }

    #[tokio::test]
    async fn zero_hits_skip_completion() {
        let store = InMemoryQdrant::default();
        QdrantFacade::new(Arc::new(store.clone()))
            .create_collection("test_collection", 3)
            .await
            .unwrap();
        let llm = completion("should not be used.");
        let p = pipeline(&topic_embedder(), &store, &llm);

        let answer = p.answer("What is RAG?").await.unwrap();

        assert!(answer.is_none());
        assert!(llm.calls().is_empty());
    }

    #[tokio::test]
    async fn end_to_end_grounds_answer_on_best_document() {
        let store = InMemoryQdrant::default();
        let llm = completion("RAG retrieves relevant documents before generating. It also");
        let p = pipeline(&topic_embedder(), &store, &llm);
        p.ingest(&[RAG_DOC, CAT_DOC], &NoopProgress).await.unwrap();

        let qa = p.answer("What is RAG?").await.unwrap().unwrap();

        assert_eq!(qa.context[0].id, 0);
        assert_eq!(qa.context[0].text, RAG_DOC);
        assert!((qa.context[0].score - 1.0).abs() < 1e-5);
        assert!(qa.context.len() <= 5);
        assert!(qa.context.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(qa.answer, "RAG retrieves relevant documents before generating.");

        let calls = llm.calls();
        assert_eq!(calls.len(), 1);
        let body: Value = serde_json::from_str(calls[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["n_predict"], 512);
        let prompt = body["prompt"].as_str().unwrap();
        let context_block = prompt
            .split("Context information:\n")
            .nth(1)
            .unwrap();
        assert!(context_block.starts_with(&format!("[1] {RAG_DOC}\n")));
        assert!(prompt.contains(&format!("[2] {CAT_DOC}\n")));
        assert!(prompt.ends_with("Question: What is RAG?\nAnswer: "));
    }

    #[tokio::test]
    async fn concurrent_ingest_keeps_ids_in_corpus_order() {
        let store = InMemoryQdrant::default();
        let cfg = ContextorConfig {
            embedding_concurrency: 4,
            ..ContextorConfig::default()
        };
        let p = Pipeline::new(
            EmbeddingService::new(Arc::new(topic_embedder())),
            QdrantFacade::new(Arc::new(store.clone())),
            CompletionService::new(Arc::new(completion("ok."))),
            &cfg,
        );
        p.ingest(&[CAT_DOC, "b", "c", RAG_DOC, "e"], &NoopProgress)
            .await
            .unwrap();

        let hits = p.retrieve("What is RAG?").await.unwrap();
        assert_eq!(hits[0].id, 3);
        assert_eq!(hits[0].text, RAG_DOC);
    }
}
