//! Thin adapter over Qdrant's REST API.
//!
//! Every method is one HTTP call with a typed JSON body; nothing is batched
//! beyond what the caller supplies and nothing is retried. Collection names
//! are passed per call so one facade can serve several collections.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use services::{HttpRequest, HttpResponse, Transport};
use tracing::{debug, info, instrument, warn};

use crate::config::VectorSpace;
use crate::errors::RagError;
use crate::record::{SearchHit, TextPayload, VectorPoint};

/// A facade over the Qdrant REST API.
#[derive(Clone)]
pub struct QdrantFacade {
    transport: Arc<dyn Transport>,
}

impl QdrantFacade {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Creates `collection` with cosine distance and vectors of `vector_size`.
    ///
    /// Qdrant rejects re-creating an existing collection; callers that want a
    /// clean slate delete it first.
    #[instrument(level = "debug", skip(self))]
    pub async fn create_collection(&self, collection: &str, vector_size: usize) -> Result<(), RagError> {
        let body = serde_json::to_string(&CreateCollectionRequest {
            vectors: VectorSpace::cosine(vector_size),
        })?;
        self.send_ok(HttpRequest::put(collection_path(collection), body))
            .await?;
        info!(collection, vector_size, "collection created");
        Ok(())
    }

    /// Probes `collection` and returns the raw HTTP status.
    ///
    /// Only the status is meaningful: `200` means the collection exists,
    /// anything else is treated as absent. Non-2xx is not an error here.
    #[instrument(level = "debug", skip(self))]
    pub async fn get_collection(&self, collection: &str) -> Result<u16, RagError> {
        let resp = self
            .transport
            .send(HttpRequest::get(collection_path(collection)))
            .await?;
        debug!(collection, status = resp.status, "collection probed");
        Ok(resp.status)
    }

    /// `true` when [`Self::get_collection`] answers `200`.
    pub async fn collection_exists(&self, collection: &str) -> Result<bool, RagError> {
        Ok(self.get_collection(collection).await? == 200)
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn delete_collection(&self, collection: &str) -> Result<(), RagError> {
        self.send_ok(HttpRequest::delete(collection_path(collection)))
            .await?;
        info!(collection, "collection deleted");
        Ok(())
    }

    /// Upserts a single point.
    pub async fn upsert_point(&self, collection: &str, point: &VectorPoint) -> Result<(), RagError> {
        self.upsert_points(collection, std::slice::from_ref(point))
            .await
    }

    /// Upserts `points` in one request.
    ///
    /// A vector whose size differs from the collection's is rejected by the
    /// store and surfaces as [`RagError::Transport`].
    #[instrument(level = "debug", skip(self, points), fields(count = points.len()))]
    pub async fn upsert_points(&self, collection: &str, points: &[VectorPoint]) -> Result<(), RagError> {
        if points.is_empty() {
            debug!("No points provided for upsert");
            return Ok(());
        }

        let body = serde_json::to_string(&UpsertPointsRequest { points })?;
        self.send_ok(HttpRequest::put(
            format!("{}/points", collection_path(collection)),
            body,
        ))
        .await?;

        info!(collection, count = points.len(), "points upserted");
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn delete_point(&self, collection: &str, point_id: u64) -> Result<(), RagError> {
        let body = serde_json::to_string(&DeletePointsRequest {
            points: vec![point_id],
        })?;
        self.send_ok(HttpRequest::post(
            format!("{}/points/delete", collection_path(collection)),
            body,
        ))
        .await?;
        debug!(collection, point_id, "point deleted");
        Ok(())
    }

    /// Returns up to `limit` hits in the order the store provides
    /// (descending similarity).
    ///
    /// # Errors
    /// - [`RagError::Transport`] on non-2xx
    /// - [`RagError::InvalidResponseFormat`] if any hit lacks an integer `id`,
    ///   a numeric `score` or a string `payload.text`
    #[instrument(level = "debug", skip(self, query_vector), fields(dim = query_vector.len()))]
    pub async fn search_similar(
        &self,
        collection: &str,
        query_vector: &[f32],
        limit: u64,
    ) -> Result<Vec<SearchHit>, RagError> {
        let body = serde_json::to_string(&SearchRequest {
            vector: query_vector,
            limit,
            with_payload: true,
        })?;
        let resp = self
            .send_ok(HttpRequest::post(
                format!("{}/points/search", collection_path(collection)),
                body,
            ))
            .await?;

        let hits = parse_search(&resp.body)?;
        if hits.len() as u64 > limit {
            warn!(returned = hits.len(), limit, "store returned more hits than requested");
        }
        debug!(collection, hits = hits.len(), "search completed");
        Ok(hits)
    }

    async fn send_ok(&self, request: HttpRequest) -> Result<HttpResponse, RagError> {
        let resp = self.transport.send(request).await?;
        if !resp.is_success() {
            warn!(
                method = %resp.request_method,
                url = %resp.request_url,
                status = resp.status,
                body = %resp.body,
                "qdrant returned non-success status"
            );
        }
        Ok(resp.error_for_status()?)
    }
}

fn collection_path(collection: &str) -> String {
    format!("/collections/{collection}")
}

fn parse_search(body: &str) -> Result<Vec<SearchHit>, RagError> {
    const EXPECTED: &str = "`result` array of {id: int, score: float, payload: {text: string}}";

    let out: SearchResponse =
        serde_json::from_str(body).map_err(|_| RagError::InvalidResponseFormat {
            expected: EXPECTED,
            body: body.to_string(),
        })?;

    Ok(out
        .result
        .into_iter()
        .map(|p| SearchHit {
            id: p.id,
            score: p.score,
            text: p.payload.text,
        })
        .collect())
}

/* ===========================================================================
HTTP payloads
======================================================================== */

#[derive(Debug, Serialize)]
struct CreateCollectionRequest {
    vectors: VectorSpace,
}

#[derive(Debug, Serialize)]
struct UpsertPointsRequest<'a> {
    points: &'a [VectorPoint],
}

#[derive(Debug, Serialize)]
struct DeletePointsRequest {
    points: Vec<u64>,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: u64,
    with_payload: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: Vec<ScoredPoint>,
}

#[derive(Debug, Deserialize)]
struct ScoredPoint {
    id: u64,
    score: f32,
    payload: TextPayload<String>,
}
